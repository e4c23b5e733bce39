//! Launching URLs in the user's default browser.

/// Opens URLs on behalf of the auth flow and the stream list.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Uses the platform opener (`xdg-open`, `open`, `start`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}

/// Public page of a live channel.
pub fn stream_url(user_login: &str) -> String {
    format!("https://twitch.tv/{user_login}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_points_at_channel_page() {
        assert_eq!(stream_url("nerd99"), "https://twitch.tv/nerd99");
    }
}
