//! Random farm events and their decision options.
//!
//! Each event offers an ordered list of options. An option is pure data: a
//! label plus a list of [`Effect`]s. Probabilistic outcomes are
//! [`Condition::Chance`] branches, so the draw happens when the player
//! picks the option, not when the event fires.
//!
//! The `welcome` event is the introduction shown at game start and is
//! never chosen by [`EventCatalog::trigger_random`].

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use demeter_types::{EventId, Gauge, Notification, NotificationKind, Resource};
use demeter_world::PlotFilter;

use crate::effects::{Condition, Effect, apply_effects};
use crate::error::GameError;
use crate::state::SimulationState;

/// Id of the introductory event.
pub const WELCOME_EVENT: &str = "welcome";

/// One choice offered by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOption {
    /// Button text.
    pub label: String,
    /// What choosing it does.
    pub effects: Vec<Effect>,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Catalog key.
    pub id: EventId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Introductory events are shown once and never drawn at random.
    pub intro: bool,
    /// Options, in display order.
    pub options: Vec<EventOption>,
}

/// What the player sees when an event fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPresentation {
    /// Event id, passed back to resolve it.
    pub id: EventId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Option labels, in order.
    pub options: Vec<String>,
}

impl From<&EventDefinition> for EventPresentation {
    fn from(def: &EventDefinition) -> Self {
        Self {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            options: def.options.iter().map(|o| o.label.clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in table helpers
// ---------------------------------------------------------------------------

fn units(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

fn spend(resource: Resource, amount: i64) -> Effect {
    Effect::SpendResource {
        resource,
        amount: units(amount),
    }
}

fn grant(resource: Resource, amount: i64) -> Effect {
    Effect::GrantResource {
        resource,
        amount: units(amount),
    }
}

fn sustainability(delta: i64) -> Effect {
    Effect::AdjustScore {
        gauge: Gauge::Sustainability,
        delta: units(delta),
    }
}

fn productivity(delta: i64) -> Effect {
    Effect::AdjustScore {
        gauge: Gauge::Productivity,
        delta: units(delta),
    }
}

/// Pay `cost` of `resource` and run `then`, or report the shortage.
fn if_affordable(resource: Resource, cost: i64, mut then: Vec<Effect>) -> Effect {
    let shortage = match resource {
        Resource::Money => "You don't have enough money!",
        Resource::Water => "You don't have enough water!",
        Resource::Research => "You don't have enough research points!",
    };
    then.insert(0, spend(resource, cost));
    Effect::ConditionalBranch {
        condition: Condition::CanAfford {
            resource,
            amount: units(cost),
        },
        then,
        otherwise: vec![Effect::notify(NotificationKind::Error, shortage)],
    }
}

fn option(label: &str, effects: Vec<Effect>) -> EventOption {
    EventOption {
        label: label.to_owned(),
        effects,
    }
}

fn event(id: &str, title: &str, description: &str, options: Vec<EventOption>) -> EventDefinition {
    EventDefinition {
        id: EventId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        intro: id == WELCOME_EVENT,
        options,
    }
}

#[allow(clippy::too_many_lines)]
fn builtin_events() -> Vec<EventDefinition> {
    use NotificationKind::{Info, Warning};

    vec![
        event(
            WELCOME_EVENT,
            "Welcome to the Farm Navigators Program",
            "Hello, new manager! Welcome to your pilot farm. Your mission is to turn it into a \
             model of productivity and sustainability using satellite data. Start by planting \
             some crops and explore the available data to make informed decisions.",
            vec![option("Let's begin!", vec![Effect::success("The season has started.")])],
        ),
        event(
            "drought",
            "Drought Alert",
            "Satellite data shows a heat wave approaching. Soil moisture is expected to drop \
             sharply over the next few days. Get ready!",
            vec![
                option(
                    "Increase irrigation (Cost: 30 water)",
                    vec![if_affordable(
                        Resource::Water,
                        30,
                        vec![
                            sustainability(-5),
                            Effect::success(
                                "You increased irrigation and protected your crops, at a cost to sustainability.",
                            ),
                        ],
                    )],
                ),
                option(
                    "Plant drought-resistant crops",
                    vec![
                        sustainability(10),
                        Effect::success(
                            "Good choice! Drought-resistant crops are more sustainable when water is scarce.",
                        ),
                    ],
                ),
                option(
                    "Ignore the alert",
                    vec![
                        Effect::MutatePlotGrid {
                            filter: PlotFilter::UnirrigatedCrops,
                        },
                        Effect::notify(Warning, "Your unirrigated crops suffered from the drought!"),
                    ],
                ),
            ],
        ),
        event(
            "heavy_rain",
            "Heavy Rain",
            "Weather data forecasts heavy rain over the next few days. It may help your crops, \
             but it may also cause soil erosion.",
            vec![
                option(
                    "Build erosion control (Cost: $50)",
                    vec![if_affordable(
                        Resource::Money,
                        50,
                        vec![
                            sustainability(15),
                            grant(Resource::Water, 20),
                            Effect::success(
                                "You built erosion control and collected the rainwater too!",
                            ),
                        ],
                    )],
                ),
                option(
                    "Cut back irrigation to save water",
                    vec![
                        grant(Resource::Water, 10),
                        sustainability(5),
                        Effect::success("You saved water by making use of the natural rain."),
                    ],
                ),
                option(
                    "Do nothing",
                    vec![Effect::ConditionalBranch {
                        condition: Condition::Chance { p: 0.5 },
                        then: vec![
                            sustainability(-10),
                            Effect::notify(
                                Warning,
                                "Unfortunately, the heavy rain eroded part of your farm.",
                            ),
                        ],
                        otherwise: vec![
                            grant(Resource::Water, 5),
                            Effect::success("The rain helped your crops without causing damage."),
                        ],
                    }],
                ),
            ],
        ),
        event(
            "pest_infestation",
            "Pest Infestation",
            "Satellite imagery shows patterns that suggest a pest infestation in your region. \
             Your crops are at risk!",
            vec![
                option(
                    "Use chemical pesticides (Cost: $100)",
                    vec![if_affordable(
                        Resource::Money,
                        100,
                        vec![
                            sustainability(-20),
                            Effect::success(
                                "The pesticides eliminated the pests, but hurt sustainability.",
                            ),
                        ],
                    )],
                ),
                option(
                    "Use biological pest control (Cost: $150)",
                    vec![if_affordable(
                        Resource::Money,
                        150,
                        vec![
                            sustainability(10),
                            Effect::success(
                                "Biological control worked and improved your sustainability!",
                            ),
                        ],
                    )],
                ),
                option(
                    "Do nothing",
                    vec![
                        productivity(-15),
                        Effect::notify(Warning, "The pests damaged your crops, reducing productivity."),
                    ],
                ),
            ],
        ),
        event(
            "market_opportunity",
            "Market Opportunity",
            "There is high demand for sustainably grown produce. This is a good chance to \
             increase your profits!",
            vec![
                option(
                    "Focus on sustainable production",
                    vec![Effect::ConditionalBranch {
                        condition: Condition::GaugeAtLeast {
                            gauge: Gauge::Sustainability,
                            threshold: units(50),
                        },
                        then: vec![
                            grant(Resource::Money, 200),
                            Effect::success("Your sustainable approach earned a $200 bonus!"),
                        ],
                        otherwise: vec![Effect::notify(
                            Info,
                            "Your farm is not sustainable enough to take this opportunity.",
                        )],
                    }],
                ),
                option(
                    "Maximize production at any cost",
                    vec![
                        grant(Resource::Money, 100),
                        sustainability(-10),
                        Effect::notify(Warning, "You earned $100, but your sustainability suffered."),
                    ],
                ),
                option(
                    "Stay the course",
                    vec![Effect::notify(Info, "You decided not to change your strategy.")],
                ),
            ],
        ),
        event(
            "research_breakthrough",
            "Research Breakthrough",
            "New satellite data could significantly improve your farming practices. This could \
             be a big step forward for your farm!",
            vec![
                option(
                    "Invest in new technology (Cost: $200)",
                    vec![if_affordable(
                        Resource::Money,
                        200,
                        vec![
                            grant(Resource::Research, 50),
                            Effect::success(
                                "You invested in new technology and earned 50 research points!",
                            ),
                        ],
                    )],
                ),
                option(
                    "Share the data with other farmers",
                    vec![
                        grant(Resource::Research, 20),
                        sustainability(10),
                        Effect::success(
                            "You shared the data, earning 20 research points and improving sustainability!",
                        ),
                    ],
                ),
                option(
                    "Ignore the new data",
                    vec![Effect::notify(Info, "You decided not to use the new data for now.")],
                ),
            ],
        ),
    ]
}

// ---------------------------------------------------------------------------
// EventCatalog
// ---------------------------------------------------------------------------

/// All known events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCatalog {
    /// Events by id.
    events: BTreeMap<EventId, EventDefinition>,
}

impl EventCatalog {
    /// The built-in events.
    pub fn builtin() -> Self {
        Self {
            events: builtin_events()
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
        }
    }

    /// Look up an event.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownEvent`] for an unknown id.
    pub fn get(&self, id: &EventId) -> Result<&EventDefinition, GameError> {
        self.events
            .get(id)
            .ok_or_else(|| GameError::UnknownEvent(id.clone()))
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.events.values()
    }

    /// Number of events, including the introduction.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Presentation of one event.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownEvent`] for an unknown id.
    pub fn present(&self, id: &EventId) -> Result<EventPresentation, GameError> {
        self.get(id).map(EventPresentation::from)
    }

    /// Pick a non-introductory event uniformly at random. `None` if there
    /// are none.
    pub fn trigger_random(&self, rng: &mut impl Rng) -> Option<EventPresentation> {
        let candidates: Vec<&EventDefinition> = self.events.values().filter(|e| !e.intro).collect();
        let picked = candidates.choose(rng)?;
        info!(event = %picked.id, "Random event triggered");
        Some(EventPresentation::from(*picked))
    }

    /// Apply option `index` of event `id` to `state`.
    ///
    /// Effects run in order on `state` directly; pass a scratch copy for
    /// all-or-nothing behaviour.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownEvent`], [`GameError::InvalidOption`],
    /// or the error of a failing effect.
    pub fn resolve(
        &self,
        state: &mut SimulationState,
        id: &EventId,
        index: usize,
        rng: &mut impl Rng,
    ) -> Result<Notification, GameError> {
        let def = self.get(id)?;
        let opt = def.options.get(index).ok_or_else(|| GameError::InvalidOption {
            event: id.clone(),
            index,
            count: def.options.len(),
        })?;

        let report = apply_effects(state, &opt.effects, &format!("EVENT:{id}"), rng)?;
        let notification = report
            .notification
            .unwrap_or_else(|| Notification::info(opt.label.clone()));
        info!(
            event = %id,
            option = index,
            dried = report.dried_plots.len(),
            outcome = %notification.message,
            "Event resolved"
        );
        Ok(notification)
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use demeter_ledger::ResourceLedger;
    use demeter_types::{CropId, PlotState};

    use super::*;
    use crate::config::SimulationConfig;

    fn state() -> SimulationState {
        SimulationState::from_config(&SimulationConfig::default()).unwrap()
    }

    fn id(s: &str) -> EventId {
        EventId::new(s)
    }

    #[test]
    fn catalog_has_intro_and_five_random_events() {
        let catalog = EventCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.iter().filter(|e| e.intro).count(), 1);
        assert!(catalog.iter().all(|e| e.intro || e.options.len() == 3));
    }

    #[test]
    fn trigger_random_never_picks_welcome() {
        let catalog = EventCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            let picked = catalog.trigger_random(&mut rng).unwrap();
            assert_ne!(picked.id.as_str(), WELCOME_EVENT);
            seen.insert(picked.id);
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn invalid_option_rejected() {
        let catalog = EventCatalog::builtin();
        let mut s = state();
        let mut rng = StdRng::seed_from_u64(5);
        let result = catalog.resolve(&mut s, &id("drought"), 3, &mut rng);
        assert!(matches!(result, Err(GameError::InvalidOption { index: 3, count: 3, .. })));
        let result = catalog.resolve(&mut s, &id("meteor"), 0, &mut rng);
        assert!(matches!(result, Err(GameError::UnknownEvent(_))));
    }

    #[test]
    fn drought_irrigation_spends_water() {
        let catalog = EventCatalog::builtin();
        let mut s = state();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = catalog.resolve(&mut s, &id("drought"), 0, &mut rng).unwrap();
        assert_eq!(outcome.kind, NotificationKind::Success);
        assert_eq!(s.ledger.balance(Resource::Water), dec!(470));
        assert_eq!(s.score.sustainability(), dec!(45));
    }

    #[test]
    fn drought_without_water_only_reports() {
        let catalog = EventCatalog::builtin();
        let mut s = state();
        s.ledger = ResourceLedger::new(dec!(1000), dec!(20), dec!(0)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = catalog.resolve(&mut s, &id("drought"), 0, &mut rng).unwrap();
        assert_eq!(outcome.kind, NotificationKind::Error);
        assert_eq!(s.ledger.balance(Resource::Water), dec!(20));
        assert_eq!(s.score.sustainability(), dec!(50));
    }

    #[test]
    fn ignoring_drought_dries_unirrigated_crops() {
        let catalog = EventCatalog::builtin();
        let mut s = state();
        s.grid.plot_mut(0).unwrap().plant(CropId::new("maize")).unwrap();
        s.grid.plot_mut(1).unwrap().plant(CropId::new("maize")).unwrap();
        s.grid.plot_mut(1).unwrap().irrigate(3).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        catalog.resolve(&mut s, &id("drought"), 2, &mut rng).unwrap();
        assert_eq!(s.grid.plot(0).unwrap().state(), PlotState::Dry);
        assert_eq!(s.grid.plot(1).unwrap().state(), PlotState::Planted);
    }

    #[test]
    fn erosion_is_drawn_at_resolution_time() {
        let catalog = EventCatalog::builtin();
        let mut eroded = false;
        let mut spared = false;
        for seed in 0..64 {
            let mut s = state();
            let mut rng = StdRng::seed_from_u64(seed);
            catalog.resolve(&mut s, &id("heavy_rain"), 2, &mut rng).unwrap();
            if s.score.sustainability() == dec!(40) {
                eroded = true;
            } else if s.ledger.balance(Resource::Water) == dec!(505) {
                spared = true;
            }
        }
        assert!(eroded && spared);
    }

    #[test]
    fn market_bonus_requires_sustainability() {
        let catalog = EventCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(5);

        let mut s = state();
        catalog.resolve(&mut s, &id("market_opportunity"), 0, &mut rng).unwrap();
        assert_eq!(s.ledger.balance(Resource::Money), dec!(1200));

        let mut s = state();
        s.score.adjust_sustainability(dec!(-1));
        let outcome = catalog.resolve(&mut s, &id("market_opportunity"), 0, &mut rng).unwrap();
        assert_eq!(outcome.kind, NotificationKind::Info);
        assert_eq!(s.ledger.balance(Resource::Money), dec!(1000));
    }

    #[test]
    fn research_investment() {
        let catalog = EventCatalog::builtin();
        let mut s = state();
        let mut rng = StdRng::seed_from_u64(5);
        catalog.resolve(&mut s, &id("research_breakthrough"), 0, &mut rng).unwrap();
        assert_eq!(s.ledger.balance(Resource::Money), dec!(800));
        assert_eq!(s.ledger.balance(Resource::Research), dec!(50));
    }

    #[test]
    fn pest_control_options() {
        let catalog = EventCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(5);

        let mut s = state();
        catalog.resolve(&mut s, &id("pest_infestation"), 1, &mut rng).unwrap();
        assert_eq!(s.ledger.balance(Resource::Money), dec!(850));
        assert_eq!(s.score.sustainability(), dec!(60));

        let mut s = state();
        catalog.resolve(&mut s, &id("pest_infestation"), 2, &mut rng).unwrap();
        assert_eq!(s.score.productivity(), dec!(35));
    }
}
