//! Five-element counter wheel.
//!
//! Elements form a single counter cycle (wood → earth → water → fire →
//! metal → wood): each element has advantage against the next one and is
//! countered by the previous one. Attacker advantage grants +30% damage,
//! disadvantage -30%; when both apply across multi-element matchups the
//! larger-magnitude effect wins and ties resolve in the attacker's favor.

use strum::EnumIter;

/// One of the five combat elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Element {
    Wood,
    Earth,
    Water,
    Fire,
    Metal,
}

impl Element {
    /// Cycle order used to derive counters.
    pub const WHEEL: [Element; 5] = [
        Element::Wood,
        Element::Earth,
        Element::Water,
        Element::Fire,
        Element::Metal,
    ];

    /// The element this one has advantage against (next on the wheel).
    pub fn counters(self) -> Element {
        let idx = Self::WHEEL.iter().position(|e| *e == self).unwrap_or(0);
        Self::WHEEL[(idx + 1) % Self::WHEEL.len()]
    }

    /// The element that has advantage against this one (previous on the wheel).
    pub fn countered_by(self) -> Element {
        let idx = Self::WHEEL.iter().position(|e| *e == self).unwrap_or(0);
        Self::WHEEL[(idx + Self::WHEEL.len() - 1) % Self::WHEEL.len()]
    }

    fn bit(self) -> u8 {
        match self {
            Element::Wood => 1 << 0,
            Element::Earth => 1 << 1,
            Element::Water => 1 << 2,
            Element::Fire => 1 << 3,
            Element::Metal => 1 << 4,
        }
    }
}

/// Compact set of elements carried by an attacker or defender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSet(u8);

impl ElementSet {
    pub const EMPTY: ElementSet = ElementSet(0);

    pub fn single(element: Element) -> Self {
        ElementSet(element.bit())
    }

    pub fn insert(&mut self, element: Element) {
        self.0 |= element.bit();
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0 & element.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        Element::WHEEL.iter().copied().filter(|e| self.contains(*e))
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut set = ElementSet::EMPTY;
        for element in iter {
            set.insert(element);
        }
        set
    }
}

/// Advantage/disadvantage magnitudes applied to the base damage multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElementRules {
    /// Bonus added to the multiplier on advantage (0.3 = +30%).
    pub bonus: f32,
    /// Penalty added on disadvantage (negative, -0.3 = -30%).
    pub penalty: f32,
}

impl Default for ElementRules {
    fn default() -> Self {
        Self {
            bonus: 0.3,
            penalty: -0.3,
        }
    }
}

/// Resolve the elemental damage multiplier for an attacker/defender pairing.
///
/// Walks every (attacker element, defender element) combination. If at least
/// one pairing is an advantage and at least one a disadvantage, the
/// larger-magnitude modifier wins; equal magnitudes resolve to the bonus.
/// Empty sets on either side mean neutral damage.
pub fn damage_multiplier(attacker: ElementSet, defender: ElementSet, rules: &ElementRules) -> f32 {
    if attacker.is_empty() || defender.is_empty() {
        return 1.0;
    }

    let mut has_advantage = false;
    let mut has_disadvantage = false;
    let mut strongest: f32 = 0.0;

    for atk in attacker.iter() {
        for def in defender.iter() {
            if atk.counters() == def {
                has_advantage = true;
                if rules.bonus.abs() > strongest.abs() {
                    strongest = rules.bonus;
                }
            } else if atk.countered_by() == def {
                has_disadvantage = true;
                if rules.penalty.abs() > strongest.abs() {
                    strongest = rules.penalty;
                }
            }
        }
    }

    if has_advantage && has_disadvantage && rules.bonus.abs() >= rules.penalty.abs() {
        return 1.0 + rules.bonus;
    }

    1.0 + strongest
}
