/// Lowercases and strips Spanish diacritics, collapsing runs of whitespace.
pub fn fold_for_match(value: &str) -> String {
  value
    .to_lowercase()
    .chars()
    .map(|c| match c {
      'á' | 'à' | 'ä' => 'a',
      'é' | 'è' | 'ë' => 'e',
      'í' | 'ì' | 'ï' => 'i',
      'ó' | 'ò' | 'ö' => 'o',
      'ú' | 'ù' | 'ü' => 'u',
      'ñ' => 'n',
      other => other,
    })
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<&str>>()
    .join(" ")
}

/// Same escaping as JavaScript's `encodeURIComponent`.
pub fn encode_uri_component(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for byte in value.bytes() {
    let keep = byte.is_ascii_alphanumeric()
      || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
    if keep {
      out.push(byte as char);
    } else {
      out.push_str(&format!("%{byte:02X}"));
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::{encode_uri_component, fold_for_match};

  #[test]
  fn folds_accents_and_case() {
    assert_eq!(fold_for_match("  Bogotá "), "bogota");
    assert_eq!(fold_for_match("CÚCUTA"), "cucuta");
    assert_eq!(fold_for_match("Santa   Marta"), "santa marta");
  }

  #[test]
  fn encodes_like_javascript() {
    assert_eq!(encode_uri_component("a b"), "a%20b");
    assert_eq!(encode_uri_component("50 %"), "50%20%25");
    assert_eq!(encode_uri_component("Sí"), "S%C3%AD");
    assert_eq!(encode_uri_component("{\"k\":1}"), "%7B%22k%22%3A1%7D");
    assert_eq!(encode_uri_component("it's(ok)!"), "it's(ok)!");
  }
}
