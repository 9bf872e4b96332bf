//! Command safety filter.
//!
//! Classifies a shell command as allowed or blocked before execution.
//! Three fixed tables are checked in strict order, first match wins:
//!
//! 1. shell operators that would chain, redirect, or substitute commands —
//!    blocked regardless of an otherwise-safe prefix;
//! 2. dangerous operation markers (substring match on the lowercased
//!    command);
//! 3. an allowlist of safe command prefixes — only these are accepted.
//!
//! Anything else is blocked with a generic reason. `evaluate` is a pure
//! function of the command string: no caching, no I/O, never fails.

/// The allow/deny decision for one candidate command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl SafetyVerdict {
    fn blocked(reason: String) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    fn allowed(reason: String) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }
}

/// Shell metacharacters that chain, redirect, or substitute commands.
///
/// `>>` is listed before `>` so the reason names the operator that was
/// actually written; either way the command is blocked.
const DENIED_OPERATORS: &[&str] = &[
    "&&", "||", ";", "|", ">>", ">", "<", "`", "$(", "$",
];

/// Substrings marking dangerous operations. Matched against the
/// lowercased command anywhere in the string.
const DANGEROUS_MARKERS: &[&str] = &[
    // privilege escalation
    "sudo",
    "su -",
    "doas",
    // destructive filesystem operations
    "rm -rf",
    "rm -r",
    "rm -f",
    "rmdir",
    "mkfs",
    "dd if=",
    "shred",
    "format c:",
    "del /",
    // network exfiltration tools
    "curl",
    "wget",
    "netcat",
    "nc -",
    "scp ",
    "rsync",
    "ftp ",
    // process killing
    "kill",
    "pkill",
    "killall",
    // system power control
    "shutdown",
    "reboot",
    "poweroff",
    "halt",
    "init 0",
    "init 6",
    // package installation
    "apt install",
    "apt-get install",
    "yum install",
    "dnf install",
    "brew install",
    "pip install",
    "npm install",
    "cargo install",
    "gem install",
    // dynamic code execution
    "eval",
    "exec",
    "python -c",
    "python3 -c",
    "node -e",
    "sh -c",
    "bash -c",
    // database CLIs
    "mysql",
    "psql",
    "sqlite3",
    "mongo",
    "redis-cli",
];

/// Prefixes of commands considered safe to run. Matched against the
/// lowercased command after trimming leading whitespace.
const SAFE_PREFIXES: &[&str] = &[
    // version control
    "git ",
    // read-only package-manager queries
    "npm list",
    "npm ls",
    "npm view",
    "npm outdated",
    "npm audit",
    "yarn list",
    "pip list",
    "pip show",
    "pip freeze",
    "cargo tree",
    "cargo metadata",
    // version checks
    "node --version",
    "node -v",
    "npm --version",
    "python --version",
    "python3 --version",
    "pip --version",
    "cargo --version",
    "rustc --version",
    "java -version",
    "go version",
    // read-only filesystem inspection
    "ls",
    "dir",
    "pwd",
    "cat ",
    "head ",
    "tail ",
    "wc ",
    "file ",
    "stat ",
    "du ",
    "df ",
    "tree",
    "find ",
    "which ",
    // safe system info
    "whoami",
    "hostname",
    "uname",
    "date",
    "uptime",
    "echo ",
    "env",
    "printenv",
];

/// Evaluate a candidate shell command against the safety policy.
///
/// Always returns a verdict; evaluation itself never fails. Idempotent:
/// the verdict is a pure function of the command string.
#[must_use]
pub fn evaluate(command: &str) -> SafetyVerdict {
    let trimmed = command.trim();
    let lowered = trimmed.to_lowercase();

    for op in DENIED_OPERATORS {
        if trimmed.contains(op) {
            return SafetyVerdict::blocked(format!(
                "Blocked: command contains shell operator {op:?} (chaining/redirection/substitution is not allowed)"
            ));
        }
    }

    for marker in DANGEROUS_MARKERS {
        if lowered.contains(marker) {
            return SafetyVerdict::blocked(format!(
                "Blocked: command contains dangerous operation {marker:?}"
            ));
        }
    }

    for prefix in SAFE_PREFIXES {
        if lowered.starts_with(prefix) {
            return SafetyVerdict::allowed(format!(
                "Allowed: command matches safe prefix {prefix:?}"
            ));
        }
    }

    SafetyVerdict::blocked(
        "Blocked: command is not in the allowlist of safe commands".to_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_block_regardless_of_prefix() {
        // A safe git prefix does not rescue a chained destructive suffix.
        let verdict = evaluate("git status && rm -rf /");
        assert!(!verdict.allowed);
        assert!(verdict.reason.contains("&&"));

        for cmd in [
            "ls | grep secret",
            "git log > /tmp/out",
            "echo `whoami`",
            "cat $HOME/.bashrc",
            "pwd; reboot",
            "ls < input",
        ] {
            assert!(!evaluate(cmd).allowed, "expected block: {cmd}");
        }
    }

    #[test]
    fn dangerous_markers_block_and_name_the_marker() {
        let verdict = evaluate("sudo apt install x");
        assert!(!verdict.allowed);
        assert!(verdict.reason.contains("sudo"));

        let verdict = evaluate("PIP INSTALL requests");
        assert!(!verdict.allowed, "matching is case-insensitive");

        assert!(!evaluate("mysql -u root").allowed);
        assert!(!evaluate("killall node").allowed);
    }

    #[test]
    fn safe_prefixes_allow() {
        for cmd in [
            "git log",
            "git status",
            "npm --version",
            "node --version",
            "ls -la",
            "pwd",
            "npm list",
            "uname -a",
        ] {
            let verdict = evaluate(cmd);
            assert!(verdict.allowed, "expected allow: {cmd} ({})", verdict.reason);
        }
    }

    #[test]
    fn unknown_commands_fall_through_to_generic_block() {
        let verdict = evaluate("make deploy");
        assert!(!verdict.allowed);
        assert!(verdict.reason.contains("allowlist"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let cmd = "git diff HEAD~1";
        assert_eq!(evaluate(cmd), evaluate(cmd));
        let cmd = "rm -rf /tmp/x";
        assert_eq!(evaluate(cmd), evaluate(cmd));
    }
}
