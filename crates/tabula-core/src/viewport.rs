//! Viewport classification

use serde::{Deserialize, Serialize};

/// Coarse device-size bucket used to choose a rendering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

/// Minimum widths (in pixels) at which tablet and desktop layouts start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub tablet: u32,
    pub desktop: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            tablet: 768,
            desktop: 1024,
        }
    }
}

impl Breakpoints {
    pub fn classify(&self, width: u32) -> Viewport {
        if width >= self.desktop {
            Viewport::Desktop
        } else if width >= self.tablet {
            Viewport::Tablet
        } else {
            Viewport::Mobile
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        let bp = Breakpoints::default();
        assert_eq!(bp.classify(0), Viewport::Mobile);
        assert_eq!(bp.classify(767), Viewport::Mobile);
        assert_eq!(bp.classify(768), Viewport::Tablet);
        assert_eq!(bp.classify(1023), Viewport::Tablet);
        assert_eq!(bp.classify(1024), Viewport::Desktop);
        assert_eq!(bp.classify(2560), Viewport::Desktop);
    }
}
