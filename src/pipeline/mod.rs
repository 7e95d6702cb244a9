//! View-state slots fed by the data layer: the people list and the
//! selected person's detail. Each slot applies only its latest load.

mod search;
mod selection;

pub use search::SearchPipeline;
pub use selection::Selection;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::swapi::resolver::Resolver;
  use crate::swapi::testing::{gateway_for, FakeTransport};
  use serde_json::json;
  use std::time::{Duration, Instant};

  const API: &str = "https://swapi.py4e.com/api/";

  fn url(path: &str) -> String {
    format!("{}{}", API, path)
  }

  #[tokio::test]
  async fn test_search_then_select_vader() {
    let fake = FakeTransport::new();
    let vader = url("people/4/");
    fake.json(
      &url("people/?search=vader&page=1"),
      json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{ "name": "Darth Vader", "url": vader }],
      }),
    );
    fake.json(
      &vader,
      json!({
        "name": "Darth Vader",
        "homeworld": url("planets/1/"),
        "films": [url("films/2/"), url("films/1/")],
        "starships": [],
        "url": vader,
      }),
    );
    fake.json(&url("planets/1/"), json!({ "name": "Tatooine" }));
    fake.json(
      &url("films/1/"),
      json!({
        "title": "A New Hope",
        "episode_id": 4,
        "characters": [url("people/1/"), vader],
      }),
    );
    fake.json(
      &url("films/2/"),
      json!({
        "title": "The Empire Strikes Back",
        "episode_id": 5,
        "characters": [vader, url("people/3/")],
      }),
    );
    fake.json(&url("people/1/"), json!({ "name": "Luke Skywalker" }));
    fake.json(&url("people/3/"), json!({ "name": "R2-D2" }));

    let gateway = gateway_for(&fake);
    let mut search = SearchPipeline::new(gateway.clone(), API, Duration::from_millis(400));
    let mut selection = Selection::new(Resolver::new(gateway));

    let t0 = Instant::now();
    search.set_text("vader", t0);
    search.tick(t0 + Duration::from_millis(400));
    tokio::time::sleep(Duration::from_millis(30)).await;
    search.tick(t0 + Duration::from_millis(430));

    assert!(fake
      .requests()
      .contains(&url("people/?search=vader&page=1")));
    let page = search.page().unwrap();
    assert_eq!(page.count, 1);

    let selected = page.results[0].url.clone();
    selection.select(&selected);
    tokio::time::sleep(Duration::from_millis(50)).await;
    selection.tick();

    let detail = selection.detail().unwrap();
    let titles: Vec<&str> = detail.films.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["A New Hope", "The Empire Strikes Back"]);
    assert_eq!(detail.homeworld.as_ref().unwrap().name, "Tatooine");
    let co_cast: Vec<&str> = detail.co_cast.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(co_cast, vec!["Luke Skywalker", "R2-D2"]);
    assert!(detail.co_cast.iter().all(|c| c.url != vader));
  }
}
