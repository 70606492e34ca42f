//! Brand constant table interpolated into rendered ad markup.
//!
//! Mirrors the published brand standards sheet; values are compile-time
//! constants so every rendered ad stays brand compliant without a lookup.

/// Colour palette used across rendered popups.
pub struct BrandColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub border: &'static str,
    pub gradient: &'static str,
}

/// Spacing scale (rem units).
pub struct BrandSpacing {
    pub xs: &'static str,
    pub sm: &'static str,
    pub md: &'static str,
    pub lg: &'static str,
    pub xl: &'static str,
    pub xxl: &'static str,
}

/// Corner radius scale.
pub struct BrandRadius {
    pub sm: &'static str,
    pub md: &'static str,
    pub lg: &'static str,
    pub xl: &'static str,
}

/// Full brand table: identity, palette, typography, spacing.
pub struct Brand {
    pub name: &'static str,
    pub tagline: &'static str,
    pub colors: BrandColors,
    pub font_family: &'static str,
    pub font_weight_semibold: u16,
    pub font_weight_bold: u16,
    pub spacing: BrandSpacing,
    pub radius: BrandRadius,
    pub button_background: &'static str,
    pub button_padding: &'static str,
    pub button_radius: &'static str,
}

/// The AISim brand standards.
pub const AISIM: Brand = Brand {
    name: "AISim",
    tagline: "AI-Powered Marketing Excellence",
    colors: BrandColors {
        primary: "#10b981",
        secondary: "#34d399",
        accent: "#059669",
        text: "#ffffff",
        text_secondary: "#9ca3af",
        background: "#0a0a0a",
        surface: "#1a1a1a",
        border: "rgba(255, 255, 255, 0.05)",
        gradient: "linear-gradient(135deg, #10b981, #34d399)",
    },
    font_family: "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'Inter', sans-serif",
    font_weight_semibold: 600,
    font_weight_bold: 700,
    spacing: BrandSpacing {
        xs: "0.25rem",
        sm: "0.5rem",
        md: "1rem",
        lg: "1.5rem",
        xl: "2rem",
        xxl: "3rem",
    },
    radius: BrandRadius {
        sm: "0.25rem",
        md: "0.5rem",
        lg: "0.75rem",
        xl: "1rem",
    },
    button_background: "linear-gradient(135deg, #10b981, #34d399)",
    button_padding: "12px 24px",
    button_radius: "8px",
};
