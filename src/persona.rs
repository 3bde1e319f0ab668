//! Persona registry
//!
//! The fixed set of boardroom roles and the behavioural instruction that
//! conditions each one's generated turns. Rotation works over the registry's
//! roster, so adding a role only touches this module.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CEO_INSTRUCTION: &str = "You are a ruthless CEO who prioritizes maximizing profit while minimizing costs. You are intelligent and smart. You make sure that everyone is on the same page. You are trying to impress the board of directors. You are very critical of the Marketing Intern's ideas but admire the bravery. You value the Marketing Strategist's inputs.";

const INTERN_INSTRUCTION: &str = "You are a Marketing Intern with unpredictable ideas, sometimes genius, sometimes absurd. You are try to impress the CEO. You talk with a lot of enthusiasm. You do not shut down anyone else's ideas.";

const STRATEGIST_INSTRUCTION: &str = "You are a Marketing Strategist who critically analyzes marketing ideas for feasibility. You are trying to impress the CEO. You want to see the product thrive. You are very critical of the Marketing Intern's ideas. You are very critical of your own ideas.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown persona: {0}")]
pub struct UnknownPersona(pub String);

/// A boardroom role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Ceo,
    MarketingIntern,
    MarketingStrategist,
}

impl Persona {
    pub const ALL: [Persona; 3] = [
        Persona::Ceo,
        Persona::MarketingIntern,
        Persona::MarketingStrategist,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Persona::Ceo => "ceo",
            Persona::MarketingIntern => "marketing_intern",
            Persona::MarketingStrategist => "marketing_strategist",
        }
    }

    /// Name used in transcript lines: `marketing_intern` -> `Marketing Intern`.
    pub fn display_name(self) -> String {
        display_name(self.id())
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Persona::Ceo => "👔",
            Persona::MarketingIntern => "🧃",
            Persona::MarketingStrategist => "📊",
        }
    }

    /// Look up a persona by its transcript display name.
    pub fn from_display_name(name: &str) -> Option<Persona> {
        Self::ALL.into_iter().find(|p| p.display_name() == name)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| UnknownPersona(s.to_string()))
    }
}

/// Underscores become spaces and each word is capitalized.
pub fn display_name(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Ordered roster of personas and their instructions. Read-only once built.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    entries: Vec<(Persona, String)>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                (Persona::Ceo, CEO_INSTRUCTION.to_string()),
                (Persona::MarketingIntern, INTERN_INSTRUCTION.to_string()),
                (Persona::MarketingStrategist, STRATEGIST_INSTRUCTION.to_string()),
            ],
        }
    }
}

impl PersonaRegistry {
    /// Build a registry from explicit entries, in speaking order.
    ///
    /// Later duplicates of a persona are ignored.
    pub fn new(entries: impl IntoIterator<Item = (Persona, String)>) -> Self {
        let mut deduped: Vec<(Persona, String)> = Vec::new();
        for (persona, instruction) in entries {
            if !deduped.iter().any(|(p, _)| *p == persona) {
                deduped.push((persona, instruction));
            }
        }
        Self { entries: deduped }
    }

    /// Instruction text for a persona identifier such as `marketing_intern`.
    ///
    /// Fails for identifiers outside the fixed set and for personas this
    /// registry was built without.
    pub fn lookup(&self, id: &str) -> Result<&str, UnknownPersona> {
        let persona: Persona = id.parse()?;
        self.entries
            .iter()
            .find(|(p, _)| *p == persona)
            .map(|(_, instruction)| instruction.as_str())
            .ok_or_else(|| UnknownPersona(id.to_string()))
    }

    /// Personas in speaking order.
    pub fn roster(&self) -> Vec<Persona> {
        self.entries.iter().map(|(p, _)| *p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Persona::Ceo.display_name(), "Ceo");
        assert_eq!(Persona::MarketingIntern.display_name(), "Marketing Intern");
        assert_eq!(
            Persona::MarketingStrategist.display_name(),
            "Marketing Strategist"
        );
        assert_eq!(display_name("chief__FINANCE_officer"), "Chief Finance Officer");
    }

    #[test]
    fn test_ids_round_trip_through_from_str() {
        for persona in Persona::ALL {
            assert_eq!(persona.id().parse::<Persona>().unwrap(), persona);
            assert_eq!(
                Persona::from_display_name(&persona.display_name()),
                Some(persona)
            );
        }
        assert_eq!(
            "cfo".parse::<Persona>(),
            Err(UnknownPersona("cfo".to_string()))
        );
    }

    #[test]
    fn test_default_registry_lookup() {
        let registry = PersonaRegistry::default();
        assert_eq!(registry.roster(), Persona::ALL.to_vec());
        assert!(registry.lookup("ceo").unwrap().contains("ruthless CEO"));
        assert!(registry
            .lookup("marketing_intern")
            .unwrap()
            .contains("unpredictable ideas"));
        assert!(registry
            .lookup("marketing_strategist")
            .unwrap()
            .contains("feasibility"));
        assert_eq!(
            registry.lookup("board_member"),
            Err(UnknownPersona("board_member".to_string()))
        );
    }

    #[test]
    fn test_subset_registry_rejects_missing_persona() {
        let registry = PersonaRegistry::new([
            (Persona::Ceo, "lead".to_string()),
            (Persona::MarketingStrategist, "analyse".to_string()),
            (Persona::Ceo, "duplicate".to_string()),
        ]);

        assert_eq!(
            registry.roster(),
            vec![Persona::Ceo, Persona::MarketingStrategist]
        );
        assert_eq!(registry.lookup("ceo").unwrap(), "lead");
        assert_eq!(
            registry.lookup("marketing_intern"),
            Err(UnknownPersona("marketing_intern".to_string()))
        );
    }
}
