use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

const WINDOW_SIZE: (u32, u32) = (1440, 900);

/// Spawns a Chrome process that accepts CDP connections
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    debugging_port: u16,
    headless: bool,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, debugging_port: u16) -> Self {
        Self {
            chrome_path,
            profile_path,
            debugging_port,
            headless: false,
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();
        tracing::debug!("Launching {} {}", self.chrome_path.display(), args.join(" "));

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-popup-blocking".to_string(),
            format!("--window-size={},{}", WINDOW_SIZE.0, WINDOW_SIZE.1),
            format!("--user-data-dir={}", self.profile_path.display()),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args.push("about:blank".to_string());
        args
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ChromeLauncher {
        ChromeLauncher::new(
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/tmp/profile"),
            9333,
        )
    }

    #[test]
    fn test_launcher_builds_args() {
        let args = launcher().build_args();

        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--disable-popup-blocking".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn test_headless_flag() {
        let launcher = launcher().headless(true);
        assert!(launcher.build_args().contains(&"--headless=new".to_string()));
        assert_eq!(launcher.debugging_port(), 9333);
    }

    #[test]
    fn test_launch_reports_missing_binary() {
        let launcher = ChromeLauncher::new(
            PathBuf::from("/nonexistent/chrome"),
            PathBuf::from("/tmp/profile"),
            9222,
        );

        let message = launcher.launch().unwrap_err().to_string();
        assert!(message.contains("Failed to launch Chrome"));
    }
}
