// tests/renderer_config.rs
use news_feed_renderer::config::{FeedLocation, RendererConfig, DEFAULT_FEED_URL};
use std::path::PathBuf;
use std::{env, fs};

fn clear_env() {
    for k in ["FEED_CONFIG_PATH", "FEED_URL", "FEED_BASE_URL", "FEED_PAGE_SIZE"] {
        env::remove_var(k);
    }
}

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("renderer.toml");
    fs::write(
        &p_toml,
        r#"
feed_url = "feeds/today.json"
page_size = 8
site_dir = "public"
"#,
    )
    .unwrap();
    let t = RendererConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.page_size, 8);
    assert_eq!(
        t.feed_location().unwrap(),
        FeedLocation::File(PathBuf::from("public/feeds/today.json"))
    );

    let p_json = dir.path().join("renderer.json");
    fs::write(
        &p_json,
        r#"{"base_url": "https://example.com/", "timeout_secs": 3}"#,
    )
    .unwrap();
    let j = RendererConfig::load_from(&p_json).unwrap();
    assert_eq!(j.timeout_secs, Some(3));
    assert_eq!(j.feed_url, DEFAULT_FEED_URL);
    assert!(matches!(j.feed_location().unwrap(), FeedLocation::Http(u) if u.as_str() == "https://example.com/news/latest.json"));
}

#[test]
fn broken_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("renderer.toml");
    fs::write(&p, "page_size = \"many\"").unwrap();
    assert!(RendererConfig::load_from(&p).is_err());
    assert!(RendererConfig::load_from(&dir.path().join("missing.toml")).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk → defaults
    let d = RendererConfig::load_default().unwrap();
    assert_eq!(d, RendererConfig::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("renderer.toml"), "page_size = 6").unwrap();
    assert_eq!(RendererConfig::load_default().unwrap().page_size, 6);

    // 3) Env path wins over the fallback
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"page_size": 20}"#).unwrap();
    env::set_var("FEED_CONFIG_PATH", p_env.display().to_string());
    assert_eq!(RendererConfig::load_default().unwrap().page_size, 20);

    // 4) Field overrides on top
    env::set_var("FEED_URL", "https://cdn.example/latest.json");
    env::set_var("FEED_PAGE_SIZE", "not-a-number");
    let o = RendererConfig::load_default().unwrap();
    assert_eq!(o.feed_url, "https://cdn.example/latest.json");
    assert_eq!(o.page_size, 20);

    env::set_var("FEED_PAGE_SIZE", "0");
    assert_eq!(RendererConfig::load_default().unwrap().page_size, 12);

    // 5) Env path to nowhere is an error
    env::set_var("FEED_CONFIG_PATH", tmp.path().join("nope.toml").display().to_string());
    assert!(RendererConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
