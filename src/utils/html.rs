// src/utils/html.rs

/// Escapes user-controlled text (subject and topic names, JSON dumps) for
/// embedding in element content or quoted attribute values.
pub fn escape(input: &str) -> String {
    ammonia::clean_text(input)
}

/// Makes serialized JSON safe to place inside a `<script>` element.
pub fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Builds `/?subject=...` style links, percent-encoding the value.
pub fn subject_query(path: &str, subject: Option<&str>) -> String {
    match subject {
        Some(subject) => {
            let encoded: String = url::form_urlencoded::byte_serialize(subject.as_bytes()).collect();
            format!("{}?subject={}", path, encoded)
        }
        None => path.to_string(),
    }
}
