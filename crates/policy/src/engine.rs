use crate::anonymise::anonymise_ips;
use redclaw_core::RiskLevel;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const LEGAL_BANNER: &str = "\
╔═══════════════════════════════════════════════════════════════╗
║                      LEGAL DISCLAIMER                         ║
╠═══════════════════════════════════════════════════════════════╣
║ redclaw is designed for ETHICAL security testing ONLY.        ║
║                                                               ║
║ • Only use on systems you own or have explicit permission     ║
║   to test                                                     ║
║ • Unauthorized access is ILLEGAL and may result in criminal   ║
║   prosecution                                                 ║
║ • You are responsible for all actions taken with this tool    ║
║ • redclaw logs every executed command for compliance          ║
╚═══════════════════════════════════════════════════════════════╝";

/// Policy flags, loaded once at process start and passed to the engine
/// constructor. Never read from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Relaxes warn-level rules to allow. Block-level rules are never
    /// relaxed.
    pub red_team_mode: bool,
    /// Rewrite IP tokens in displayed/logged text. The executed command
    /// keeps its real targets.
    pub anonymise_ips: bool,
    /// Show the legal banner before prompt-driven operations and on
    /// warn/block decisions.
    pub show_banner: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            red_team_mode: false,
            anonymise_ips: false,
            show_banner: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Warn,
    Block,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Warn => "warn",
            Verdict::Block => "block",
        }
    }
}

/// Outcome of evaluating a prompt or command.
///
/// `reasons` is empty exactly when the verdict is allow.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub verdict: Verdict,
    pub reasons: Vec<String>,
    pub requires_banner: bool,
}

impl PolicyDecision {
    /// Risk classification recorded on suggestions at proposal time.
    pub fn risk_level(&self) -> RiskLevel {
        match self.verdict {
            Verdict::Allow => RiskLevel::Low,
            Verdict::Warn => RiskLevel::Medium,
            Verdict::Block => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Prompt,
    Command,
}

/// A candidate to classify: free-form prompt text or a concrete command,
/// optionally tagged with the target tool name.
#[derive(Debug, Clone)]
pub struct Subject<'a> {
    pub kind: SubjectKind,
    pub text: &'a str,
    pub tool: Option<&'a str>,
}

impl<'a> Subject<'a> {
    pub fn prompt(text: &'a str) -> Self {
        Self {
            kind: SubjectKind::Prompt,
            text,
            tool: None,
        }
    }

    pub fn command(text: &'a str) -> Self {
        Self {
            kind: SubjectKind::Command,
            text,
            tool: None,
        }
    }

    pub fn command_for_tool(text: &'a str, tool: &'a str) -> Self {
        Self {
            kind: SubjectKind::Command,
            text,
            tool: Some(tool),
        }
    }
}

struct Rule {
    pattern: Regex,
    reason: &'static str,
}

fn rule(pattern: &str, reason: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("static rule pattern must compile"),
        reason,
    }
}

/// Destructive-action patterns. Matching any of these blocks the command
/// under every configuration.
fn block_rules() -> Vec<Rule> {
    vec![
        rule(
            r"rm\s+-(rf|fr)\s+/(\s|$)",
            "destructive: deletes the root filesystem",
        ),
        rule(r"dd\s+if=/dev/", "destructive: raw disk read/write via dd"),
        rule(r">\s*/dev/sd[a-z]", "destructive: writes directly to a block device"),
        rule(
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}",
            "destructive: fork bomb pattern",
        ),
        rule(r"\bmkfs(\.[a-z0-9]+)?\b", "destructive: filesystem creation"),
        rule(r"\bshred\b[^|;]*/dev/", "destructive: shreds a raw device"),
    ]
}

/// Patterns that require explicit scope acknowledgment. Warn-level:
/// relaxed to allow under red-team mode.
fn warn_rules() -> Vec<Rule> {
    vec![
        rule(
            r"\b\d{1,3}(\.\d{1,3}){3}/([0-8])\b",
            "broad network range requires explicit scope acknowledgment",
        ),
        rule(
            r"\*\.[a-z0-9][a-z0-9.-]*",
            "wildcard target requires explicit scope acknowledgment",
        ),
        rule(
            r"\bbrute[\s_-]?force\b|\b(password|credential)\s+dump",
            "potential unauthorized access (brute force / credential dumping)",
        ),
        rule(
            r"exploit[^|;]*\bprod(uction)?\b|\bprod(uction)?\b[^|;]*exploit",
            "targets a production system",
        ),
    ]
}

/// Tools the engine recognises; commands for anything else warn with an
/// explicit reason. Unknown is not unsafe, but it must never pass silently.
const KNOWN_TOOLS: &[&str] = &[
    "nmap", "masscan", "zmap", "nikto", "wpscan", "sqlmap", "gobuster", "dirb", "ffuf",
    "wfuzz", "hydra", "medusa", "john", "hashcat", "aircrack-ng", "wifite", "tcpdump",
    "tshark", "wireshark", "msfconsole", "searchsploit", "amass", "subfinder", "whatweb",
    "wafw00f", "dnsrecon", "dnsenum", "theharvester", "recon-ng", "enum4linux",
    "smbclient", "netcat", "nc", "curl", "wget", "dig", "whois", "ping", "traceroute",
];

/// Classifies prompts and commands against the rule set.
pub struct PolicyEngine {
    config: PolicyConfig,
    block: Vec<Rule>,
    warn: Vec<Rule>,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            block: block_rules(),
            warn: warn_rules(),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate a subject. Pure and deterministic for a given engine
    /// configuration: no hidden state, no I/O.
    pub fn evaluate(&self, subject: &Subject<'_>) -> PolicyDecision {
        let text = subject.text.to_lowercase();

        let block_reasons: Vec<String> = self
            .block
            .iter()
            .filter(|r| r.pattern.is_match(&text))
            .map(|r| r.reason.to_string())
            .collect();

        if !block_reasons.is_empty() {
            tracing::warn!(subject = subject.text, "policy block");
            return PolicyDecision {
                verdict: Verdict::Block,
                reasons: block_reasons,
                requires_banner: self.config.show_banner,
            };
        }

        let mut warn_reasons: Vec<String> = self
            .warn
            .iter()
            .filter(|r| r.pattern.is_match(&text))
            .map(|r| r.reason.to_string())
            .collect();

        if self.config.red_team_mode && !warn_reasons.is_empty() {
            tracing::debug!(
                relaxed = warn_reasons.len(),
                "red-team mode relaxed warn-level rules"
            );
            warn_reasons.clear();
        }

        // Unknown tools stay warn even in red-team mode: the reason must
        // always surface.
        if let Some(tool) = subject.tool {
            if !KNOWN_TOOLS.contains(&tool.to_lowercase().as_str()) {
                warn_reasons.push(format!("unknown tool '{tool}'"));
            }
        }

        let verdict = if warn_reasons.is_empty() {
            Verdict::Allow
        } else {
            Verdict::Warn
        };

        let requires_banner = self.config.show_banner
            && (subject.kind == SubjectKind::Prompt || verdict != Verdict::Allow);

        PolicyDecision {
            verdict,
            reasons: warn_reasons,
            requires_banner,
        }
    }

    /// The form of a command shown to the user and written to logs.
    /// Identical to the input unless IP anonymisation is enabled.
    pub fn display_text(&self, command: &str) -> String {
        if self.config.anonymise_ips {
            anonymise_ips(command)
        } else {
            command.to_string()
        }
    }

    pub fn legal_banner(&self) -> Option<&'static str> {
        self.config.show_banner.then_some(LEGAL_BANNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(config: PolicyConfig) -> PolicyEngine {
        PolicyEngine::new(config)
    }

    fn default_engine() -> PolicyEngine {
        engine(PolicyConfig::default())
    }

    #[test]
    fn safe_scan_is_allowed() {
        let d = default_engine().evaluate(&Subject::command("nmap -sCV -p 22,80 10.0.0.5"));
        assert_eq!(d.verdict, Verdict::Allow);
        assert!(d.reasons.is_empty());
    }

    #[test]
    fn root_wipe_is_blocked() {
        let d = default_engine().evaluate(&Subject::command("rm -rf /"));
        assert_eq!(d.verdict, Verdict::Block);
        assert!(!d.reasons.is_empty());
    }

    #[test]
    fn dd_to_device_is_blocked() {
        let d = default_engine().evaluate(&Subject::command("dd if=/dev/zero of=/dev/sda"));
        assert_eq!(d.verdict, Verdict::Block);
    }

    #[test]
    fn mkfs_variants_blocked() {
        assert_eq!(
            default_engine()
                .evaluate(&Subject::command("mkfs.ext4 /dev/sda1"))
                .verdict,
            Verdict::Block
        );
        assert_eq!(
            default_engine().evaluate(&Subject::command("mkfs /dev/sdb")).verdict,
            Verdict::Block
        );
    }

    #[test]
    fn fork_bomb_blocked() {
        let d = default_engine().evaluate(&Subject::command(":(){ :|:& };:"));
        assert_eq!(d.verdict, Verdict::Block);
    }

    #[test]
    fn broad_range_warns() {
        let d = default_engine().evaluate(&Subject::command("masscan 0.0.0.0/0 -p80"));
        assert_eq!(d.verdict, Verdict::Warn);
        assert!(d.reasons[0].contains("scope"));
    }

    #[test]
    fn narrow_range_is_fine() {
        let d = default_engine().evaluate(&Subject::command("nmap -sn 10.0.0.0/24"));
        assert_eq!(d.verdict, Verdict::Allow);
    }

    #[test]
    fn red_team_relaxes_warn_rules() {
        let config = PolicyConfig {
            red_team_mode: true,
            ..PolicyConfig::default()
        };
        let d = engine(config).evaluate(&Subject::command("hydra brute-force run on 10.0.0.5"));
        assert_eq!(d.verdict, Verdict::Allow);
        assert!(d.reasons.is_empty());
    }

    #[test]
    fn red_team_never_relaxes_block() {
        let config = PolicyConfig {
            red_team_mode: true,
            ..PolicyConfig::default()
        };
        let d = engine(config).evaluate(&Subject::command("rm -rf / --no-preserve-root"));
        assert_eq!(d.verdict, Verdict::Block);
    }

    #[test]
    fn unknown_tool_warns_with_reason() {
        let d = default_engine().evaluate(&Subject::command_for_tool(
            "frobnicate --target host",
            "frobnicate",
        ));
        assert_eq!(d.verdict, Verdict::Warn);
        assert!(d.reasons.iter().any(|r| r.contains("unknown tool")));
    }

    #[test]
    fn unknown_tool_warns_even_in_red_team_mode() {
        let config = PolicyConfig {
            red_team_mode: true,
            ..PolicyConfig::default()
        };
        let d = engine(config)
            .evaluate(&Subject::command_for_tool("frobnicate host", "frobnicate"));
        assert_eq!(d.verdict, Verdict::Warn);
        assert!(!d.reasons.is_empty());
    }

    #[test]
    fn known_tool_does_not_warn() {
        let d = default_engine()
            .evaluate(&Subject::command_for_tool("nmap -sn 10.0.0.5", "nmap"));
        assert_eq!(d.verdict, Verdict::Allow);
    }

    #[test]
    fn reasons_empty_iff_allow() {
        let e = default_engine();
        for text in [
            "nmap -sn 10.0.0.5",
            "rm -rf /",
            "masscan 0.0.0.0/0",
            "nikto -h *.example.com",
        ] {
            let d = e.evaluate(&Subject::command(text));
            assert_eq!(
                d.reasons.is_empty(),
                d.verdict == Verdict::Allow,
                "reasons/verdict mismatch for {text}"
            );
        }
    }

    #[test]
    fn prompt_requires_banner_when_enabled() {
        let d = default_engine().evaluate(&Subject::prompt("how do I scan my network"));
        assert!(d.requires_banner);

        let config = PolicyConfig {
            show_banner: false,
            ..PolicyConfig::default()
        };
        let d = engine(config).evaluate(&Subject::prompt("how do I scan my network"));
        assert!(!d.requires_banner);
    }

    #[test]
    fn display_text_follows_config() {
        let plain = default_engine();
        assert_eq!(plain.display_text("nmap 10.0.0.5"), "nmap 10.0.0.5");

        let config = PolicyConfig {
            anonymise_ips: true,
            ..PolicyConfig::default()
        };
        assert_eq!(engine(config).display_text("nmap 10.0.0.5"), "nmap 10.0.0.X");
    }

    #[test]
    fn risk_levels_map_from_verdicts() {
        use redclaw_core::RiskLevel;
        let e = default_engine();
        let allow = e.evaluate(&Subject::command("nmap -sn 10.0.0.5"));
        let warn = e.evaluate(&Subject::command("masscan 0.0.0.0/0"));
        let block = e.evaluate(&Subject::command("rm -rf /"));
        assert_eq!(allow.risk_level(), RiskLevel::Low);
        assert_eq!(warn.risk_level(), RiskLevel::Medium);
        assert_eq!(block.risk_level(), RiskLevel::High);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const CANDIDATES: &[&str] = &[
            "nmap -sCV 10.0.0.5",
            "rm -rf /",
            "dd if=/dev/zero of=/dev/sda",
            "masscan 0.0.0.0/0 -p443",
            "hydra -l admin -P rockyou.txt brute force target",
            "mkfs.ext4 /dev/sdb1",
            "nikto -h https://target.example",
            "shred -n 3 /dev/sdc",
        ];

        proptest! {
            // Block verdicts must be invariant under every configuration
            // combination.
            #[test]
            fn block_never_relaxed(
                idx in 0..CANDIDATES.len(),
                red_team in any::<bool>(),
                anonymise in any::<bool>(),
                banner in any::<bool>(),
            ) {
                let strict = PolicyEngine::new(PolicyConfig {
                    red_team_mode: false,
                    anonymise_ips: false,
                    show_banner: true,
                });
                let candidate = CANDIDATES[idx];
                let baseline = strict.evaluate(&Subject::command(candidate));

                let variant = PolicyEngine::new(PolicyConfig {
                    red_team_mode: red_team,
                    anonymise_ips: anonymise,
                    show_banner: banner,
                });
                let decision = variant.evaluate(&Subject::command(candidate));

                if baseline.verdict == Verdict::Block {
                    prop_assert_eq!(decision.verdict, Verdict::Block);
                }
            }

            // Display rewriting never changes the executed text argument.
            #[test]
            fn display_text_is_pure(idx in 0..CANDIDATES.len()) {
                let e = PolicyEngine::new(PolicyConfig {
                    anonymise_ips: true,
                    ..PolicyConfig::default()
                });
                let candidate = CANDIDATES[idx];
                let first = e.display_text(candidate);
                let second = e.display_text(candidate);
                prop_assert_eq!(first, second);
            }
        }
    }
}
