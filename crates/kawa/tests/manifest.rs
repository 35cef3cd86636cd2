use kawa::{
    manifest::{fetch_manifest, Manifest},
    KawaError,
};
use reqwest::StatusCode;
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn sample_manifest() -> &'static str {
    r#"{
        "clip_id": "abcdef",
        "base_url": "../",
        "video": [
            {
                "id": "v1080",
                "base_url": "1080p/",
                "format": "dash",
                "mime_type": "video/mp4",
                "codecs": "avc1.64002a",
                "bitrate": 5000000,
                "avg_bitrate": 4800000,
                "framerate": 30.0,
                "width": 1920,
                "height": 1080,
                "init_segment": "SU5JVA==",
                "index_segment": "index.mp4",
                "segments": [{"url": "seg-0.m4s"}, {"url": "seg-1.m4s"}]
            }
        ],
        "audio": [
            {
                "id": "a128",
                "base_url": "audio/",
                "mime_type": "audio/mp4",
                "codecs": "mp4a.40.2",
                "avg_bitrate": 128000,
                "init_segment": "SU5JVA==",
                "segments": [{"url": "seg-0.m4a"}]
            }
        ]
    }"#
}

#[test]
fn test_parse_manifest() -> anyhow::Result<()> {
    let manifest: Manifest = serde_json::from_str(sample_manifest())?;

    assert_eq!(manifest.base_url, "../");
    assert_eq!(manifest.video.len(), 1);
    assert_eq!(manifest.audio.len(), 1);

    let video = &manifest.video[0];
    assert_eq!(video.id, "v1080");
    assert_eq!(video.pixels(), 1920 * 1080);
    assert_eq!(video.init_data()?, b"INIT");
    assert_eq!(video.index_segment.as_deref(), Some("index.mp4"));
    assert_eq!(video.segments.len(), 2);

    Ok(())
}

#[test]
fn test_manifest_without_audio_parses_empty() -> anyhow::Result<()> {
    let manifest: Manifest = serde_json::from_str(
        r#"{
            "base_url": "./",
            "video": [{
                "id": "v", "base_url": "v/", "init_segment": "",
                "segments": []
            }]
        }"#,
    )?;
    assert!(manifest.audio.is_empty());

    Ok(())
}

#[test]
fn test_manifest_missing_video_is_an_error() {
    let result: Result<Manifest, _> = serde_json::from_str(r#"{"base_url": "./"}"#);
    assert!(result.is_err());
}

#[test]
fn test_media_segment_resolution_chain() -> anyhow::Result<()> {
    let manifest: Manifest = serde_json::from_str(sample_manifest())?;
    let manifest_url = Url::parse("https://example.com/streams/42/master.json")?;
    let base = kawa::manifest::join_url(&manifest_url, &manifest.base_url)?;
    assert_eq!(base.as_str(), "https://example.com/streams/");

    let video = &manifest.video[0];
    let variant_base = video.resolve_base(&base)?;
    assert_eq!(variant_base.as_str(), "https://example.com/streams/1080p/");

    let segments = video.media_segments(&variant_base)?;
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].sequence, 0);
    assert_eq!(
        segments[0].url.as_str(),
        "https://example.com/streams/1080p/seg-0.m4s"
    );
    assert_eq!(segments[1].sequence, 1);
    assert_eq!(
        segments[1].url.as_str(),
        "https://example.com/streams/1080p/seg-1.m4s"
    );

    let index = video.index_url(&variant_base)?;
    assert_eq!(
        index.unwrap().as_str(),
        "https://example.com/streams/1080p/index.mp4"
    );

    Ok(())
}

#[tokio::test]
async fn test_fetch_manifest_resolves_base() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/streams/master.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_manifest()))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let manifest_url = Url::parse(&format!("{}/streams/master.json", server.uri()))?;
    let (manifest, base) = fetch_manifest(&client, &manifest_url).await?;

    assert_eq!(manifest.video.len(), 1);
    assert_eq!(base.as_str(), format!("{}/", server.uri()));

    Ok(())
}

#[tokio::test]
async fn test_fetch_manifest_surfaces_error_title() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/streams/master.json"))
        .respond_with(
            ResponseTemplate::new(410)
                .set_body_string("<html><head><TITLE>Gone Fishing</TITLE></head></html>"),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let manifest_url = Url::parse(&format!("{}/streams/master.json", server.uri()))?;
    let result = fetch_manifest(&client, &manifest_url).await;

    match result {
        Err(KawaError::ManifestError { status, title }) => {
            assert_eq!(status, StatusCode::GONE);
            assert_eq!(title.as_deref(), Some("Gone Fishing"));
        }
        other => panic!("expected manifest error, got {other:?}"),
    }

    Ok(())
}
