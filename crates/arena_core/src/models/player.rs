use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Highest base attribute accepted at roster input.
pub const MAX_BASE_ATTRIBUTE: u8 = 60;

/// Player data for the match simulation engine.
///
/// # Boundary Contract
/// - Supplied once at match creation as a roster snapshot
/// - `current_stamina`, `injury` and `position` are match-time state; they
///   default when the roster omits them
/// - Effective attributes are never stored here, see
///   [`crate::engine::performance::effective_attribute`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, JsonSchema)]
pub struct Player {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub race: Race,
    pub role: Role,
    #[validate]
    pub attributes: Attributes,
    /// Match-time stamina (0..=max_stamina). `None` at input means "fresh".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stamina: Option<f32>,
    #[serde(default)]
    pub injury: InjuryState,
    #[serde(default)]
    pub position: FieldPosition,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Sylvan,
    Gryll,
    Lumina,
    Umbra,
}

impl Race {
    pub const ALL: [Race; 5] = [Race::Human, Race::Sylvan, Race::Gryll, Race::Lumina, Race::Umbra];

    pub fn name(&self) -> &'static str {
        match self {
            Race::Human => "Human",
            Race::Sylvan => "Sylvan",
            Race::Gryll => "Gryll",
            Race::Lumina => "Lumina",
            Race::Umbra => "Umbra",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Passer,
    Runner,
    Blocker,
    Wildcard,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Passer, Role::Runner, Role::Blocker, Role::Wildcard];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Passer => "passer",
            Role::Runner => "runner",
            Role::Blocker => "blocker",
            Role::Wildcard => "wildcard",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Speed,
    Power,
    Throwing,
    Catching,
    Kicking,
    Stamina,
    Leadership,
    Agility,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Speed,
        Attribute::Power,
        Attribute::Throwing,
        Attribute::Catching,
        Attribute::Kicking,
        Attribute::Stamina,
        Attribute::Leadership,
        Attribute::Agility,
    ];

    /// Attributes affected by injuries.
    pub fn is_physical(&self) -> bool {
        matches!(self, Attribute::Speed | Attribute::Power | Attribute::Agility | Attribute::Catching)
    }
}

/// Base attributes (1..=60 at input).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate, JsonSchema)]
pub struct Attributes {
    #[validate(range(min = 1, max = 60))]
    pub speed: u8,
    #[validate(range(min = 1, max = 60))]
    pub power: u8,
    #[validate(range(min = 1, max = 60))]
    pub throwing: u8,
    #[validate(range(min = 1, max = 60))]
    pub catching: u8,
    #[validate(range(min = 1, max = 60))]
    pub kicking: u8,
    #[validate(range(min = 1, max = 60))]
    pub stamina: u8,
    #[validate(range(min = 1, max = 60))]
    pub leadership: u8,
    #[validate(range(min = 1, max = 60))]
    pub agility: u8,
}

impl Attributes {
    pub fn uniform(value: u8) -> Self {
        Self {
            speed: value,
            power: value,
            throwing: value,
            catching: value,
            kicking: value,
            stamina: value,
            leadership: value,
            agility: value,
        }
    }

    pub fn get(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Speed => self.speed,
            Attribute::Power => self.power,
            Attribute::Throwing => self.throwing,
            Attribute::Catching => self.catching,
            Attribute::Kicking => self.kicking,
            Attribute::Stamina => self.stamina,
            Attribute::Leadership => self.leadership,
            Attribute::Agility => self.agility,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InjuryState {
    #[default]
    Healthy,
    Minor,
    Moderate,
    Severe,
}

impl InjuryState {
    /// Flat penalty applied to physical attributes.
    pub fn attribute_penalty(&self) -> f32 {
        match self {
            InjuryState::Healthy => 0.0,
            InjuryState::Minor => 1.0,
            InjuryState::Moderate => 3.0,
            InjuryState::Severe => 6.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InjuryState::Healthy => "healthy",
            InjuryState::Minor => "minor",
            InjuryState::Moderate => "moderate",
            InjuryState::Severe => "severe",
        }
    }

    /// Injuries never heal during a match.
    pub fn worsen_to(self, other: InjuryState) -> InjuryState {
        self.max(other)
    }
}

/// Normalized field coordinate. `x` runs from own goal line (0.0) to the
/// opponent's (1.0), `y` across the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FieldPosition {
    pub x: f32,
    pub y: f32,
}

impl Default for FieldPosition {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl FieldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x: clamp_unit(x), y: clamp_unit(y) }
    }

    pub fn is_on_field(&self) -> bool {
        [self.x, self.y].iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }

    pub fn distance(&self, other: &FieldPosition) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        race: Race,
        role: Role,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            race,
            role,
            attributes,
            current_stamina: None,
            injury: InjuryState::Healthy,
            position: FieldPosition::default(),
        }
    }

    /// Max stamina derived from the stamina attribute (40..=100).
    /// Deserialized match-time state must already be in range; the setters
    /// clamp but a JSON roster bypasses them.
    pub fn check_match_state(&self) -> Result<(), String> {
        if let Some(stamina) = self.current_stamina {
            if !stamina.is_finite() || !(0.0..=self.max_stamina()).contains(&stamina) {
                return Err(format!("current_stamina {stamina} outside 0..={}", self.max_stamina()));
            }
        }
        if !self.position.is_on_field() {
            return Err(format!("position ({}, {}) outside the unit field", self.position.x, self.position.y));
        }
        Ok(())
    }

    pub fn max_stamina(&self) -> f32 {
        let attr = self.attributes.stamina.min(MAX_BASE_ATTRIBUTE) as f32;
        (40.0 + 1.2 * attr).clamp(40.0, 100.0)
    }

    pub fn stamina(&self) -> f32 {
        self.current_stamina.unwrap_or_else(|| self.max_stamina())
    }

    /// Sets stamina, keeping it inside `0..=max_stamina`.
    pub fn set_stamina(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.current_stamina = Some(value.clamp(0.0, self.max_stamina()));
    }

    pub fn adjust_stamina(&mut self, delta: f32) {
        let next = self.stamina() + delta;
        self.set_stamina(next);
    }

    pub fn is_available(&self) -> bool {
        self.injury != InjuryState::Severe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Player {
        Player::new("p1", "Kara Vell", Race::Sylvan, Role::Runner, Attributes::uniform(30))
    }

    #[test]
    fn test_max_stamina_from_attribute() {
        let mut player = sample();
        assert!((player.max_stamina() - 76.0).abs() < 0.001);

        player.attributes.stamina = 60;
        assert!((player.max_stamina() - 100.0).abs() < 0.001);

        player.attributes.stamina = 1;
        assert!((player.max_stamina() - 41.2).abs() < 0.001);
    }

    #[test]
    fn test_stamina_stays_in_bounds() {
        let mut player = sample();
        player.adjust_stamina(500.0);
        assert_eq!(player.stamina(), player.max_stamina());

        player.adjust_stamina(-1000.0);
        assert_eq!(player.stamina(), 0.0);

        player.set_stamina(f32::NAN);
        assert_eq!(player.stamina(), 0.0);
    }

    #[test]
    fn test_attribute_validation() {
        let mut player = sample();
        assert!(player.validate().is_ok());

        player.attributes.power = 0;
        assert!(player.validate().is_err());

        player.attributes.power = 61;
        assert!(player.validate().is_err());
    }

    #[test]
    fn test_injury_only_worsens() {
        assert_eq!(InjuryState::Moderate.worsen_to(InjuryState::Minor), InjuryState::Moderate);
        assert_eq!(InjuryState::Minor.worsen_to(InjuryState::Severe), InjuryState::Severe);
    }

    #[test]
    fn test_field_position_clamped() {
        let pos = FieldPosition::new(1.4, -0.2);
        assert_eq!(pos, FieldPosition { x: 1.0, y: 0.0 });
        assert_eq!(FieldPosition::new(f32::NAN, 0.3).x, 0.5);
    }
}
