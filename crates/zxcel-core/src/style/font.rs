//! Font settings: family, size, weight and slant

/// Stroke weight of a font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Slant of a font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

/// Font of a cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontStyle {
    /// Family name, e.g. "Calibri"
    pub family: String,
    /// Size in points
    pub size: f64,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            family: String::from("Calibri"),
            size: 11.0,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
        }
    }
}

impl FontStyle {
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.slant == FontSlant::Italic
    }

    /// Switch between bold and normal weight
    pub fn toggle_bold(&mut self) {
        self.weight = match self.weight {
            FontWeight::Normal => FontWeight::Bold,
            FontWeight::Bold => FontWeight::Normal,
        };
    }

    /// Switch between italic and upright
    pub fn toggle_italic(&mut self) {
        self.slant = match self.slant {
            FontSlant::Normal => FontSlant::Italic,
            FontSlant::Italic => FontSlant::Normal,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles() {
        let mut font = FontStyle::default();
        assert!(!font.is_bold());

        font.toggle_bold();
        font.toggle_italic();
        assert!(font.is_bold());
        assert!(font.is_italic());

        font.toggle_bold();
        assert_eq!(font.weight, FontWeight::Normal);
    }
}
