use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Depth, Tone};

/// User-chosen research options sent alongside a topic.
///
/// Defaults to `comprehensive` / `professional`. An empty `{}` from the
/// backend deserializes to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Customization {
    pub depth: Depth,
    pub tone: Tone,
}

impl Customization {
    #[must_use]
    pub const fn new(depth: Depth, tone: Tone) -> Self {
        Self { depth, tone }
    }

    /// Flip between a deep and a quick search.
    pub const fn toggle_depth(&mut self) {
        self.depth = match self.depth {
            Depth::Deep => Depth::Basic,
            Depth::Basic | Depth::Comprehensive => Depth::Deep,
        };
    }

    /// Flip between a professional and an academic register.
    pub const fn toggle_tone(&mut self) {
        self.tone = match self.tone {
            Tone::Professional => Tone::Academic,
            Tone::Academic | Tone::Creative => Tone::Professional,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let parsed: Customization = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Customization::default());
        assert_eq!(parsed.depth, Depth::Comprehensive);
        assert_eq!(parsed.tone, Tone::Professional);
    }

    #[test]
    fn toggles_cycle_between_two_values() {
        let mut c = Customization::default();
        c.toggle_depth();
        assert_eq!(c.depth, Depth::Deep);
        c.toggle_depth();
        assert_eq!(c.depth, Depth::Basic);
        c.toggle_depth();
        assert_eq!(c.depth, Depth::Deep);

        c.toggle_tone();
        assert_eq!(c.tone, Tone::Academic);
        c.toggle_tone();
        assert_eq!(c.tone, Tone::Professional);
    }

    #[test]
    fn creative_tone_toggles_to_professional() {
        let mut c = Customization::new(Depth::Comprehensive, Tone::Creative);
        c.toggle_tone();
        assert_eq!(c.tone, Tone::Professional);
        c.toggle_depth();
        assert_eq!(c.depth, Depth::Deep);
    }
}
