use super::*;
use crate::models::Format;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPEN_LIBRARY_DUNE: &str = r#"{
    "numFound": 2,
    "docs": [
        {
            "key": "/works/OL893415W",
            "title": "Dune",
            "author_name": ["Frank Herbert"],
            "first_publish_year": 1965,
            "cover_i": 11481354
        },
        {
            "key": "/works/OL1W",
            "title": "Dune Messiah"
        }
    ]
}"#;

const OMDB_HEAT: &str = r#"{
    "Search": [
        {"Title": "Heat", "Year": "1995", "imdbID": "tt0113277", "Type": "movie", "Poster": "N/A"}
    ],
    "totalResults": "1",
    "Response": "True"
}"#;

async fn client_for(server: &MockServer, key: Option<&str>) -> MetadataClient {
    MetadataClient::new(key.map(str::to_string)).with_base_urls(&server.uri(), &server.uri())
}

mod book_search_tests {
    use super::*;

    #[tokio::test]
    async fn maps_open_library_docs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "dune"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OPEN_LIBRARY_DUNE))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let hits = client.search(MediaKind::Book, "dune").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Dune");
        assert_eq!(hits[0].author.as_deref(), Some("Frank Herbert"));
        assert_eq!(hits[0].year, Some(1965));
        assert_eq!(
            hits[0].cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/11481354-M.jpg")
        );
        assert_eq!(hits[1].author, None);
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OPEN_LIBRARY_DUNE))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let first = client.search(MediaKind::Book, "Dune").await.unwrap();
        let second = client.search(MediaKind::Book, "  dune ").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let err = client.search(MediaKind::Book, "dune").await.unwrap_err();
        assert!(matches!(err, SearchError::HttpStatus(s) if s.as_u16() == 503));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let err = client.search(MediaKind::Book, "dune").await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn blank_query_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OPEN_LIBRARY_DUNE))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        assert!(client.search(MediaKind::Book, "   ").await.unwrap().is_empty());
    }
}

mod movie_search_tests {
    use super::*;

    #[tokio::test]
    async fn requires_api_key() {
        let server = MockServer::start().await;
        let client = client_for(&server, Some("  ")).await;
        let err = client.search(MediaKind::Movie, "heat").await.unwrap_err();
        assert!(matches!(err, SearchError::MissingApiKey));
    }

    #[tokio::test]
    async fn maps_omdb_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "k123"))
            .and(query_param("s", "heat"))
            .and(query_param("type", "movie"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OMDB_HEAT))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k123")).await;
        let hits = client.search(MediaKind::Movie, "heat").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, MediaKind::Movie);
        assert_eq!(hits[0].year, Some(1995));
        assert_eq!(hits[0].external_id.as_deref(), Some("tt0113277"));
        assert_eq!(hits[0].cover_url, None);
    }

    #[tokio::test]
    async fn not_found_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Response":"False","Error":"Movie not found!"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k")).await;
        assert!(client.search(MediaKind::Movie, "zzzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Response":"False","Error":"Invalid API key!"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad")).await;
        let err = client.search(MediaKind::Movie, "heat").await.unwrap_err();
        assert_eq!(err.to_string(), "OMDb error: Invalid API key!");
    }

    #[tokio::test]
    async fn details_carry_director() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0113277"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Title":"Heat","Year":"1995","Director":"Michael Mann","imdbID":"tt0113277","Poster":"N/A","Response":"True"}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k")).await;
        let hit = client.movie_details("tt0113277").await.unwrap();
        assert_eq!(hit.author.as_deref(), Some("Michael Mann"));
        assert_eq!(hit.year, Some(1995));
    }
}

mod draft_tests {
    use super::*;

    #[test]
    fn hit_becomes_prefilled_draft() {
        let hit = MetadataHit {
            kind: MediaKind::Movie,
            title: "Heat".to_string(),
            author: None,
            year: Some(1995),
            external_id: None,
            cover_url: None,
        };
        let settings = Settings {
            default_movie_format: Some(Format::BluRay),
            ..Default::default()
        };
        let draft = hit.to_draft(&settings);
        assert_eq!(draft.title, "Heat");
        assert_eq!(draft.author, "Unknown");
        assert_eq!(draft.year, Some(1995));
        assert_eq!(draft.format, Some(Format::BluRay));
        assert_eq!(draft.category, None);
    }

    #[test]
    fn series_year_takes_first() {
        assert_eq!(leading_year("2008–2013"), Some(2008));
        assert_eq!(leading_year("N/A"), None);
    }
}
