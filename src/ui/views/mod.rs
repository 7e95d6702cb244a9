mod people_list;
mod person_detail;

pub use people_list::PeopleListView;
pub use person_detail::PersonDetailView;
