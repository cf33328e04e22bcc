use serde::{Deserialize, Serialize};

/// Texture sampling filter, cycled at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    Nearest,
    Linear,
    Anisotropic,
}

impl FilterMode {
    /// Next mode in the fixed Nearest -> Linear -> Anisotropic cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Nearest => Self::Linear,
            Self::Linear => Self::Anisotropic,
            Self::Anisotropic => Self::Nearest,
        }
    }
}

/// Rasterizer cull mode, cycled at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl CullMode {
    /// Next mode in the fixed Back -> Front -> None cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::None,
            Self::None => Self::Back,
        }
    }
}

/// Explicit render configuration passed to Update/Render each frame.
///
/// All runtime toggles live here so the renderer never reads ambient
/// mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Auto-rotate every mesh at a fixed angular speed.
    pub rotate_meshes: bool,
    /// Use the dark clear color instead of cornflower blue.
    pub alt_clear_color: bool,
    /// Draw meshes beyond the first.
    pub show_secondary: bool,
    pub filter_mode: FilterMode,
    pub cull_mode: CullMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            rotate_meshes: true,
            alt_clear_color: false,
            show_secondary: true,
            filter_mode: FilterMode::Anisotropic,
            cull_mode: CullMode::Back,
        }
    }
}

impl RenderSettings {
    /// Background clear color derived from the `alt_clear_color` toggle.
    pub fn clear_color(&self) -> [f64; 4] {
        if self.alt_clear_color {
            [0.1, 0.1, 0.1, 1.0]
        } else {
            [0.39, 0.59, 0.93, 1.0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_mode_cycle_wraps() {
        let mut mode = FilterMode::Nearest;
        mode = mode.next();
        assert_eq!(mode, FilterMode::Linear);
        mode = mode.next();
        assert_eq!(mode, FilterMode::Anisotropic);
        mode = mode.next();
        assert_eq!(mode, FilterMode::Nearest);
    }

    #[test]
    fn cull_mode_cycle_wraps() {
        assert_eq!(CullMode::Back.next(), CullMode::Front);
        assert_eq!(CullMode::Front.next(), CullMode::None);
        assert_eq!(CullMode::None.next(), CullMode::Back);
    }

    #[test]
    fn clear_color_follows_toggle() {
        let mut settings = RenderSettings::default();
        assert_eq!(settings.clear_color(), [0.39, 0.59, 0.93, 1.0]);
        settings.alt_clear_color = true;
        assert_eq!(settings.clear_color(), [0.1, 0.1, 0.1, 1.0]);
    }

    #[test]
    fn defaults_match_startup_state() {
        let settings = RenderSettings::default();
        assert!(settings.rotate_meshes);
        assert!(settings.show_secondary);
        assert_eq!(settings.filter_mode, FilterMode::Anisotropic);
        assert_eq!(settings.cull_mode, CullMode::Back);
    }
}
