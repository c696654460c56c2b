use serde::{Deserialize, Serialize};

/// Colour scheme chosen by the shopper, persisted locally as a `darkMode` flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ThemePreference;

    #[test]
    fn toggling_twice_returns_to_the_original_theme() {
        let theme = ThemePreference::default();
        assert_eq!(theme, ThemePreference::Light);
        assert!(theme.toggled().is_dark());
        assert_eq!(theme.toggled().toggled(), theme);
    }

    #[test]
    fn dark_mode_flag_maps_to_theme() {
        assert_eq!(ThemePreference::from_dark_mode(true), ThemePreference::Dark);
        assert_eq!(ThemePreference::from_dark_mode(false), ThemePreference::Light);
    }
}
