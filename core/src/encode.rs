//! Query-string and `application/x-www-form-urlencoded` encoding.

use std::collections::HashMap;

use url::form_urlencoded;

/// Encode `key=value` pairs joined with `&`, form-escaping both sides.
pub fn encode_form<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// Encode `params` as a query string with a leading `?`, or `""` when empty.
///
/// Pair order follows the map's iteration order and is not stable.
pub fn build_query_string(params: &HashMap<String, String>) -> String {
    if params.is_empty() {
        return String::new();
    }
    format!("?{}", encode_form(params))
}
