use mockito::Matcher;
use ttdeezer::DeezerClient;

#[tokio::test]
async fn album_image_prefers_the_largest_cover() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"{"data": [{
        "cover": "https://img.example/base.jpg",
        "cover_medium": "https://img.example/m.jpg",
        "cover_big": "https://img.example/b.jpg",
        "cover_xl": "https://img.example/xl.jpg"
    }]}"#;
    let mock = server
        .mock("GET", "/search/album")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".to_string(), "artist:\"Caribou\" album:\"Swim\"".to_string()),
            Matcher::UrlEncoded("limit".to_string(), "1".to_string()),
        ]))
        .with_body(body)
        .create_async()
        .await;

    let client = DeezerClient::with_base_url(server.url()).unwrap();
    let image = client.album_image("Caribou", "Swim").await.unwrap();
    mock.assert_async().await;
    assert_eq!(image.as_deref(), Some("https://img.example/xl.jpg"));
}

#[tokio::test]
async fn album_image_falls_through_missing_sizes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/album")
        .match_query(Matcher::Any)
        .with_body(r#"{"data": [{"cover_medium": "https://img.example/m.jpg"}]}"#)
        .create_async()
        .await;

    let client = DeezerClient::with_base_url(server.url()).unwrap();
    let image = client.album_image("Caribou", "Swim").await.unwrap();
    assert_eq!(image.as_deref(), Some("https://img.example/m.jpg"));
}

#[tokio::test]
async fn empty_search_result_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/album")
        .match_query(Matcher::Any)
        .with_body(r#"{"data": []}"#)
        .create_async()
        .await;

    let client = DeezerClient::with_base_url(server.url()).unwrap();
    assert_eq!(client.album_image("Nobody", "Nothing").await.unwrap(), None);
}

#[tokio::test]
async fn artist_image_uses_the_search_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/artist")
        .match_query(Matcher::UrlEncoded("q".to_string(), "Caribou".to_string()))
        .with_body(r#"{"data": [{"picture": "https://img.example/caribou.jpg"}]}"#)
        .create_async()
        .await;

    let client = DeezerClient::with_base_url(server.url()).unwrap();
    let image = client.artist_image("Caribou").await.unwrap();
    mock.assert_async().await;
    assert_eq!(image.as_deref(), Some("https://img.example/caribou.jpg"));
}

#[tokio::test]
async fn server_error_surfaces_as_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/album")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = DeezerClient::with_base_url(server.url()).unwrap();
    assert!(client.album_image("Caribou", "Swim").await.is_err());
}
