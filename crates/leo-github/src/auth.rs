use std::path::Path;

use secrecy::SecretString;

/// Environment variable holding a GitHub token.
pub const TOKEN_ENV: &str = "GH_TOKEN";

const NETRC_MACHINE: &str = "github.com";

/// Discover a GitHub token: `GH_TOKEN` (a `.env` file is loaded first),
/// then the `github.com` password in `~/.netrc`.
///
/// `None` means requests go out unauthenticated and are rate-limited.
pub fn discover_token() -> Option<SecretString> {
    // Attempt to load .env file (silently ignore if not found)
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    tracing::debug!(dotenv = dotenv_loaded, "discovering GitHub token");

    if let Some(token) = std::env::var_os(TOKEN_ENV)
        // arch-lint: allow(no-silent-result-drop) reason="a non-UTF-8 token cannot be sent in a header; treated as absent"
        .and_then(|v| v.into_string().ok())
        .filter(|v| !v.trim().is_empty())
    {
        tracing::debug!(source = TOKEN_ENV, "using GitHub token");
        return Some(SecretString::from(token));
    }

    let home = std::env::var_os("HOME")?;
    let netrc = Path::new(&home).join(".netrc");
    // arch-lint: allow(no-silent-result-drop) reason="no readable .netrc means no stored credentials"
    let content = std::fs::read_to_string(&netrc).ok()?;
    let token = netrc_password(&content, NETRC_MACHINE)?;
    tracing::debug!(source = %netrc.display(), "using GitHub token");
    Some(SecretString::from(token))
}

/// Password of `machine` in netrc-formatted `content`.
///
/// Tokens are whitespace separated and taken literally, so quoted values
/// are not supported. `macdef` bodies are skipped up to the next blank line.
pub fn netrc_password(content: &str, machine: &str) -> Option<String> {
    let mut tokens = netrc_tokens(content).into_iter();
    let mut current: Option<&str> = None;

    while let Some(token) = tokens.next() {
        match token {
            "machine" => current = tokens.next(),
            "default" => current = None,
            "password" => {
                let value = tokens.next()?;
                if current == Some(machine) {
                    return Some(value.to_owned());
                }
            }
            _ => {}
        }
    }
    None
}

fn netrc_tokens(content: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_macro = false;

    for line in content.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        for word in line.split_whitespace() {
            if word == "macdef" {
                in_macro = true;
                break;
            }
            tokens.push(word);
        }
    }
    tokens
}
