//! Translation of friendly option names into the names `in.php` expects.
//!
//! The table is static. Only keys that are present get renamed, everything
//! else passes through untouched. `sitekey` has a method-specific wire name.

use crate::models::OptionValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Maximum number of images a multi-file captcha may carry (`file_1..file_9`).
pub const FILES_LIMIT: usize = 9;

/// Friendly name → wire name, shared by every method.
const COMMON_MAP: &[(&str, &str)] = &[
    ("base64", "body"),
    ("caseSensitive", "regsense"),
    ("minLen", "min_len"),
    ("maxLen", "max_len"),
    ("hintText", "textinstructions"),
    ("hintImg", "imginstructions"),
    ("url", "pageurl"),
    ("score", "min_score"),
    ("text", "textcaptcha"),
    ("rows", "recaptcharows"),
    ("cols", "recaptchacols"),
    ("previousId", "previousID"),
    ("canSkip", "can_no_answer"),
    ("apiServer", "api_server"),
    ("softId", "soft_id"),
    ("callback", "pingback"),
];

/// Wire name of `sitekey` for the given method, if it is renamed at all.
pub fn sitekey_wire_name(method: &str) -> Option<&'static str> {
    match method {
        "userrecaptcha" => Some("googlekey"),
        "funcaptcha" => Some("publickey"),
        "capy" => Some("captchakey"),
        _ => None,
    }
}

/// Full rename table for a method.
pub fn params_map(method: &str) -> Vec<(&'static str, &'static str)> {
    let mut map = COMMON_MAP.to_vec();
    if let Some(wire) = sitekey_wire_name(method) {
        map.push(("sitekey", wire));
    }
    map
}

/// Keys whose values may be uploaded as multipart attachments.
pub fn file_keys() -> Vec<String> {
    let mut keys = vec!["file".to_string(), "hintImg".to_string()];
    keys.extend((1..=FILES_LIMIT).map(|i| format!("file_{}", i)));
    keys
}

/// Apply the rename table to any keyed collection.
pub fn rename_keys<V>(params: &mut BTreeMap<String, V>, method: &str) {
    for (friendly, wire) in params_map(method) {
        if let Some(value) = params.remove(friendly) {
            params.insert(wire.to_string(), value);
        }
    }
}

/// Rename keys and expand a nested proxy into `proxy` + `proxytype`.
pub fn map_params(params: &mut BTreeMap<String, OptionValue>, method: &str) {
    rename_keys(params, method);

    if let Some(OptionValue::Proxy(proxy)) = params.remove("proxy") {
        params.insert("proxy".to_string(), OptionValue::Text(proxy.uri));
        params.insert(
            "proxytype".to_string(),
            OptionValue::Text(proxy.proxy_type.as_str().to_string()),
        );
    }
}

/// Move every file-valued option that points at an existing file into its own set.
///
/// Files that do not exist stay behind and are sent as plain fields.
pub fn extract_files(params: &mut BTreeMap<String, OptionValue>) -> BTreeMap<String, PathBuf> {
    let mut files = BTreeMap::new();

    for key in file_keys() {
        let is_upload = params
            .get(&key)
            .and_then(OptionValue::as_file)
            .is_some_and(|path| path.is_file());

        if is_upload {
            if let Some(OptionValue::File(path)) = params.remove(&key) {
                files.insert(key, path);
            }
        }
    }

    files
}

/// Flatten mapped options into form fields.
pub fn into_wire_fields(params: BTreeMap<String, OptionValue>) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| match value.to_wire() {
            Some(wire) => Some((key, wire)),
            None => {
                tracing::warn!(key = %key, "Dropping option that has no form encoding");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProxyConfig, ProxyType};

    fn text(map: &BTreeMap<String, OptionValue>, key: &str) -> Option<String> {
        map.get(key).and_then(OptionValue::to_wire)
    }

    #[test]
    fn test_common_renames() {
        let mut params = BTreeMap::new();
        params.insert("base64".to_string(), OptionValue::from("aGVsbG8="));
        params.insert("minLen".to_string(), OptionValue::Int(4));
        params.insert("callback".to_string(), OptionValue::from("https://cb"));
        params.insert("numeric".to_string(), OptionValue::Int(1));

        map_params(&mut params, "base64");

        assert_eq!(text(&params, "body").as_deref(), Some("aGVsbG8="));
        assert_eq!(text(&params, "min_len").as_deref(), Some("4"));
        assert_eq!(text(&params, "pingback").as_deref(), Some("https://cb"));
        assert_eq!(text(&params, "numeric").as_deref(), Some("1"));
        assert!(!params.contains_key("base64"));
        assert!(!params.contains_key("minLen"));
        assert!(!params.contains_key("callback"));
    }

    #[test]
    fn test_sitekey_override_per_method() {
        for (method, wire) in [
            ("userrecaptcha", "googlekey"),
            ("funcaptcha", "publickey"),
            ("capy", "captchakey"),
        ] {
            let mut params = BTreeMap::new();
            params.insert("sitekey".to_string(), OptionValue::from("K"));
            map_params(&mut params, method);
            assert_eq!(text(&params, wire).as_deref(), Some("K"), "method {}", method);
            assert!(!params.contains_key("sitekey"), "method {}", method);
        }

        for method in ["hcaptcha", "post", "geetest"] {
            let mut params = BTreeMap::new();
            params.insert("sitekey".to_string(), OptionValue::from("K"));
            map_params(&mut params, method);
            assert_eq!(text(&params, "sitekey").as_deref(), Some("K"), "method {}", method);
            assert_eq!(params.len(), 1);
        }
    }

    #[test]
    fn test_untouched_keys_are_idempotent() {
        let mut params = BTreeMap::new();
        params.insert("method".to_string(), OptionValue::from("post"));
        params.insert("numeric".to_string(), OptionValue::Int(4));
        params.insert("lang".to_string(), OptionValue::from("en"));

        let mut once = params.clone();
        map_params(&mut once, "post");
        let mut twice = once.clone();
        map_params(&mut twice, "post");

        assert_eq!(once, params);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_proxy_expansion() {
        let mut params = BTreeMap::new();
        params.insert(
            "proxy".to_string(),
            OptionValue::Proxy(ProxyConfig::new(ProxyType::Https, "login:pass@1.2.3.4:3128")),
        );

        map_params(&mut params, "userrecaptcha");

        assert_eq!(text(&params, "proxy").as_deref(), Some("login:pass@1.2.3.4:3128"));
        assert_eq!(text(&params, "proxytype").as_deref(), Some("HTTPS"));
    }

    #[test]
    fn test_extract_files_only_takes_existing_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("captcha.jpg");
        std::fs::write(&image, b"fake").unwrap();

        let mut params = BTreeMap::new();
        params.insert("file".to_string(), OptionValue::File(image.clone()));
        params.insert("hintImg".to_string(), OptionValue::File(dir.path().join("missing.jpg")));
        params.insert(
            "text".to_string(),
            OptionValue::Text(image.display().to_string()),
        );

        let files = extract_files(&mut params);

        assert_eq!(files.len(), 1);
        assert_eq!(files.get("file"), Some(&image));
        assert!(!params.contains_key("file"));
        assert!(params.contains_key("hintImg"));
        // plain text is never treated as a path
        assert!(params.contains_key("text"));
    }

    #[test]
    fn test_file_set_is_renamed_too() {
        let mut files = BTreeMap::new();
        files.insert("hintImg".to_string(), PathBuf::from("hint.png"));
        files.insert("file_1".to_string(), PathBuf::from("a.png"));

        rename_keys(&mut files, "rotatecaptcha");

        assert!(files.contains_key("imginstructions"));
        assert!(files.contains_key("file_1"));
        assert!(!files.contains_key("hintImg"));
    }

    #[test]
    fn test_file_keys() {
        let keys = file_keys();
        assert_eq!(keys.len(), 11);
        assert_eq!(keys.last().map(String::as_str), Some("file_9"));
    }
}
