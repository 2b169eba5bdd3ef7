//! Fixed-appearance drawable component.

use std::any::Any;

use crate::appearance::EntityAppearance;
use crate::component::{Component, ComponentTag, Role};
use crate::defs::{DefError, PropBag};

/// Draws the entity as a fixed symbol with fixed colors.
///
/// Definition keys: `Symbol`, `Foreground`, `Background`.
#[derive(Debug, Clone)]
pub struct StaticDrawable {
    /// Display symbol.
    pub symbol: char,
    /// Foreground palette index.
    pub fg: u8,
    /// Background palette index.
    pub bg: u8,
}

impl StaticDrawable {
    /// Definition type name.
    pub const NAME: &'static str = "StaticDrawable";
    /// Registry tag.
    pub const TAG: ComponentTag = ComponentTag::from_name(Self::NAME);
}

impl Default for StaticDrawable {
    fn default() -> Self {
        Self {
            symbol: '?',
            fg: 7,
            bg: 0,
        }
    }
}

impl Component for StaticDrawable {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn roles(&self) -> &'static [Role] {
        &[Role::Drawable]
    }

    fn configure(&mut self, props: &PropBag) -> Result<(), DefError> {
        if let Some(symbol) = props.get_char("Symbol")? {
            self.symbol = symbol;
        }
        if let Some(fg) = props.get_i64("Foreground")? {
            self.fg = fg as u8;
        }
        if let Some(bg) = props.get_i64("Background")? {
            self.bg = bg as u8;
        }
        Ok(())
    }

    fn appearance(&self) -> Option<EntityAppearance> {
        Some(EntityAppearance {
            symbol: self.symbol,
            fg: self.fg,
            bg: self.bg,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_reads_known_keys() {
        let mut drawable = StaticDrawable::default();
        let serde_json::Value::Object(map) = serde_json::json!({
            "Symbol": ",",
            "Foreground": 3,
            "Unrecognised": true,
        }) else {
            unreachable!()
        };
        drawable.configure(&PropBag(map)).unwrap();
        assert_eq!(drawable.symbol, ',');
        assert_eq!(drawable.fg, 3);
        assert_eq!(drawable.bg, 0);
    }

    #[test]
    fn test_appearance_matches_configuration() {
        let drawable = StaticDrawable {
            symbol: 'r',
            fg: 3,
            bg: 0,
        };
        let app = drawable.appearance().unwrap();
        assert_eq!(app.symbol, 'r');
        assert_eq!(app.fg, 3);
    }
}
