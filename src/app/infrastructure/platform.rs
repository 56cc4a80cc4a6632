use crate::app::domain::settings::ThemeMode;

/// Resolve the configured theme mode to a concrete dark/light flag.
pub fn resolve_dark_mode(mode: ThemeMode) -> bool {
    match mode {
        ThemeMode::Light => false,
        ThemeMode::Dark => true,
        ThemeMode::SystemDefault => detect_system_dark_mode(),
    }
}

pub fn detect_system_dark_mode() -> bool {
    // Windows: AppsUseLightTheme is 0 when dark mode is on
    #[cfg(target_os = "windows")]
    {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        if let Ok(hkcu) = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
            && let Ok(value) = hkcu.get_value::<u32, _>("AppsUseLightTheme")
        {
            return value == 0;
        }
    }

    #[cfg(target_os = "linux")]
    {
        use std::process::Command;

        for key in ["gtk-theme", "color-scheme"] {
            if let Ok(output) = Command::new("gsettings")
                .args(["get", "org.gnome.desktop.interface", key])
                .output()
                && gsettings_reports_dark(&String::from_utf8_lossy(&output.stdout))
            {
                return true;
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        if let Ok(output) = Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            && output.status.success()
        {
            let style = String::from_utf8_lossy(&output.stdout).to_lowercase();
            if style.contains("dark") {
                return true;
            }
        }
    }

    tracing::debug!("no dark theme preference detected, using light");
    false
}

/// `gsettings` prints either a theme name (`'Adwaita-dark'`) or a color
/// scheme (`'prefer-dark'`); both contain "dark" when the desktop is dark.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn gsettings_reports_dark(output: &str) -> bool {
    output.to_lowercase().contains("dark")
}
