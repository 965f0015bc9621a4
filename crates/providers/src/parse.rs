use crate::traits::BackendError;
use serde::Deserialize;

/// One command proposed by the backend in Suggest mode.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedCommand {
    #[serde(default = "unknown_tool")]
    pub tool: String,
    #[serde(alias = "cmd")]
    pub command: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

fn unknown_tool() -> String {
    "unknown".to_string()
}

/// Extract the suggestion array from a Suggest-mode response.
///
/// Models wrap the JSON in prose or code fences often enough that this
/// takes the span from the first `[` to the last `]` before parsing, the
/// same tolerance the rest of the ecosystem applies to LLM output.
pub fn extract_suggestions(text: &str) -> Result<Vec<SuggestedCommand>, BackendError> {
    let start = text
        .find('[')
        .ok_or_else(|| BackendError::Parse("no JSON array in response".to_string()))?;
    let end = text
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| BackendError::Parse("unterminated JSON array in response".to_string()))?;

    serde_json::from_str(&text[start..=end]).map_err(|e| BackendError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array() {
        let text = r#"[{"tool": "nmap", "command": "nmap -sn 10.0.0.0/24", "description": "ping sweep"}]"#;
        let suggestions = extract_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].tool, "nmap");
        assert_eq!(suggestions[0].command, "nmap -sn 10.0.0.0/24");
    }

    #[test]
    fn parses_array_inside_code_fence() {
        let text = "Here you go:\n```json\n[{\"tool\": \"nikto\", \"command\": \"nikto -h 10.0.0.5\", \"description\": \"web scan\"}]\n```\nGood luck!";
        let suggestions = extract_suggestions(text).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].tool, "nikto");
    }

    #[test]
    fn accepts_cmd_and_desc_aliases() {
        let text = r#"[{"tool": "gobuster", "cmd": "gobuster dir -u http://10.0.0.5", "desc": "dir brute"}]"#;
        let suggestions = extract_suggestions(text).unwrap();
        assert_eq!(suggestions[0].command, "gobuster dir -u http://10.0.0.5");
        assert_eq!(suggestions[0].description, "dir brute");
    }

    #[test]
    fn missing_tool_defaults_to_unknown() {
        let text = r#"[{"command": "whatweb 10.0.0.5"}]"#;
        let suggestions = extract_suggestions(text).unwrap();
        assert_eq!(suggestions[0].tool, "unknown");
    }

    #[test]
    fn prose_without_array_is_a_parse_error() {
        let err = extract_suggestions("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn malformed_array_is_a_parse_error() {
        let err = extract_suggestions("[{not json}]").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }
}
