// Kept in its own test binary: it mutates process environment variables.

use docqa_core::config::Config;
use tempfile::TempDir;

#[test]
fn app_env_vars_override_files() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), "[pipeline]\ntop_k = 4\n").unwrap();

    std::env::set_var("APP_PIPELINE__TOP_K", "7");
    std::env::set_var("APP_PROVIDER__BASE_URL", "http://localhost:9999/v1");
    let settings = Config::load_from(tmp.path(), "dev").unwrap().settings().unwrap();
    std::env::remove_var("APP_PIPELINE__TOP_K");
    std::env::remove_var("APP_PROVIDER__BASE_URL");

    assert_eq!(settings.pipeline.top_k, 7);
    assert_eq!(settings.provider.base_url, "http://localhost:9999/v1");
}

#[test]
fn production_requires_an_api_key() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.prod.toml"), "[provider]\napi_key = \"sk-test\"\n").unwrap();
    let settings = Config::load_from(tmp.path(), "prod").unwrap().settings().unwrap();
    assert_eq!(settings.provider.api_key.as_deref(), Some("sk-test"));
}
