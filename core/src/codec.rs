//! Form encoding of request parameters.
//!
//! Uses `application/x-www-form-urlencoded` rules: space becomes `+` and
//! every byte outside ASCII alphanumerics and `*-._` is percent-escaped, so
//! group pad ids such as `g.abc$notes` travel as `g.abc%24notes`. The API key
//! pair always comes first, followed by the caller's pairs in insertion
//! order.

use url::form_urlencoded;

use crate::params::ParameterSet;

/// Name of the credential parameter.
pub const API_KEY_PARAM: &str = "apikey";

/// Encode `params` with the credential into a form string. The same input
/// always produces the same bytes.
pub fn encode(params: &ParameterSet, api_key: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair(API_KEY_PARAM, api_key);
    for (name, value) in params.iter() {
        if name == API_KEY_PARAM {
            continue;
        }
        serializer.append_pair(name, &value.to_wire());
    }
    serializer.finish()
}

/// Decode a form string back into ordered `(name, value)` pairs.
pub fn decode(encoded: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "a04f17343b51afaa036a7428171dd873469cd85911ab43be0503d29d2acbbd58";

    #[test]
    fn credential_comes_first() {
        let params = ParameterSet::new().with("padID", "p1");
        assert_eq!(encode(&params, KEY), format!("apikey={KEY}&padID=p1"));
    }

    #[test]
    fn empty_set_only_carries_credential() {
        assert_eq!(encode(&ParameterSet::new(), "k"), "apikey=k");
    }

    #[test]
    fn group_pad_id_is_escaped() {
        let params = ParameterSet::new().with("padID", "g.XXXX$name with spaces å");
        assert_eq!(
            encode(&params, "k"),
            "apikey=k&padID=g.XXXX%24name+with+spaces+%C3%A5"
        );
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let params = ParameterSet::new().with("text", "a&b=c+d/e?f#g%h");
        assert_eq!(
            encode(&params, "k"),
            "apikey=k&text=a%26b%3Dc%2Bd%2Fe%3Ff%23g%25h"
        );
    }

    #[test]
    fn html_body_matches_service_encoding() {
        let params = ParameterSet::new()
            .with("padID", "integration-test-pad")
            .with(
                "html",
                "<!DOCTYPE HTML><html><body><p>gå og gjøre et ærend igjen</p></body></html>",
            );
        assert_eq!(
            encode(&params, "k"),
            "apikey=k&padID=integration-test-pad&html=%3C%21DOCTYPE+HTML%3E%3Chtml%3E%3Cbody%3E%3Cp%3Eg%C3%A5+og+gj%C3%B8re+et+%C3%A6rend+igjen%3C%2Fp%3E%3C%2Fbody%3E%3C%2Fhtml%3E"
        );
    }

    #[test]
    fn scalar_values_use_canonical_forms() {
        let params = ParameterSet::new()
            .with("sourceID", "a")
            .with("destinationID", "b")
            .with("force", false)
            .with("rev", 2);
        assert_eq!(
            encode(&params, "k"),
            "apikey=k&sourceID=a&destinationID=b&force=false&rev=2"
        );
    }

    #[test]
    fn caller_cannot_override_credential() {
        let params = ParameterSet::new().with("apikey", "other").with("padID", "p");
        assert_eq!(encode(&params, "k"), "apikey=k&padID=p");
    }

    #[test]
    fn decode_restores_original_values() {
        let samples = [
            "plain",
            "g.XXXX$name with spaces å",
            "gå å gjør et ærend",
            "a&b=c+d%e",
            "emoji 🎉 and tab\t",
            "",
        ];
        for sample in samples {
            let params = ParameterSet::new().with("padID", sample).with("rev", 3);
            let decoded = decode(&encode(&params, "k"));
            assert_eq!(
                decoded,
                vec![
                    ("apikey".to_string(), "k".to_string()),
                    ("padID".to_string(), sample.to_string()),
                    ("rev".to_string(), "3".to_string()),
                ],
                "round trip of {sample:?}"
            );
        }
    }
}
