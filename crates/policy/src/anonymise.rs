use regex::Regex;
use std::sync::OnceLock;

static IP_TOKEN: OnceLock<Regex> = OnceLock::new();

fn ip_token() -> &'static Regex {
    IP_TOKEN.get_or_init(|| {
        Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){2})\.\d{1,3}\b").expect("static IP pattern must compile")
    })
}

/// Rewrite IPv4 tokens for display and logging: the last octet becomes `X`.
///
/// This is applied to displayed/logged text only, never to the command that
/// actually runs — the executed form must still target the real host.
pub fn anonymise_ips(text: &str) -> String {
    ip_token().replace_all(text, "$1.X").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_last_octet() {
        assert_eq!(anonymise_ips("nmap -sn 192.168.1.17"), "nmap -sn 192.168.1.X");
    }

    #[test]
    fn keeps_cidr_suffix() {
        assert_eq!(anonymise_ips("masscan 10.0.0.0/24"), "masscan 10.0.0.X/24");
    }

    #[test]
    fn multiple_addresses() {
        assert_eq!(
            anonymise_ips("curl 10.1.2.3 10.1.2.4"),
            "curl 10.1.2.X 10.1.2.X"
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(anonymise_ips("nikto -h target.example"), "nikto -h target.example");
    }
}
