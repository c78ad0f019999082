//! End-to-end engine tests: simulated respondents through the full audit
//! pipeline against the SQLite store.

use rustc_hash::FxHashMap;

use calibra_analysis::audit::{override_status, recalculate_item, run_audit, AuditContext};
use calibra_analysis::irt::probability;
use calibra_analysis::review::items_requiring_review;
use calibra_core::config::CalibraConfig;
use calibra_core::errors::{AuditError, StatusError};
use calibra_core::traits::{ItemCatalog, ItemOptions, ResponseSource, StatisticsStore};
use calibra_core::types::{
    BigFiveTrait, CompetencyId, ItemId, ItemStatistics, OptionId, ReliabilityStatus, Response,
    SessionId, ValidityStatus,
};
use calibra_storage::SqliteStatisticsStore;

const NOW: i64 = 1_700_000_000;

// ---------------------------------------------------------------------------
// Deterministic simulation helpers
// ---------------------------------------------------------------------------

/// Van der Corput base-2 sequence: evenly distributed uniforms without a
/// random number generator, so every run is identical.
fn van_der_corput(mut n: u64) -> f64 {
    let mut q = 0.0;
    let mut bk = 0.5;
    while n > 0 {
        q += (n & 1) as f64 * bk;
        n >>= 1;
        bk *= 0.5;
    }
    q
}

/// Rational approximation of the standard normal quantile, good to ~1e-3:
/// evenly spaced quantiles stand in for N(0, 1) ability draws.
fn normal_quantile(p: f64) -> f64 {
    let p = p.clamp(1e-9, 1.0 - 1e-9);
    if p > 0.5 {
        return -normal_quantile(1.0 - p);
    }
    let t = (-2.0 * p.ln()).sqrt();
    let numerator = 2.515_517 + 0.802_853 * t + 0.010_328 * t * t;
    let denominator = 1.0 + 1.432_788 * t + 0.189_269 * t * t + 0.001_308 * t * t * t;
    -(t - numerator / denominator)
}

/// Simulate dichotomous responses for one competency under known 2PL
/// parameters: 60 respondents with abilities drawn from N(0, 1).
fn simulate_competency(
    competency: &str,
    true_a: &[f64],
    true_b: &[f64],
    respondents: usize,
) -> Vec<Response> {
    let mut responses = Vec::new();
    for j in 0..respondents {
        let theta = normal_quantile((j as f64 + 0.5) / respondents as f64);
        let session = SessionId::new(format!("{competency}-s{j:03}"));
        for (i, (&a, &b)) in true_a.iter().zip(true_b).enumerate() {
            let p = probability(theta, a, b);
            let draw = van_der_corput(j as u64 + 7 * i as u64 + 1);
            let score = if draw < p { 1.0 } else { 0.0 };
            responses.push(Response::new(
                session.clone(),
                ItemId::new(format!("{competency}-q{i:02}")),
                score,
            ));
        }
    }
    responses
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SimSource {
    by_competency: FxHashMap<CompetencyId, Vec<Response>>,
    selections: FxHashMap<ItemId, FxHashMap<OptionId, u32>>,
}

impl SimSource {
    fn add_competency(&mut self, competency: &str, responses: Vec<Response>) {
        self.by_competency
            .insert(CompetencyId::from(competency), responses);
    }
}

impl ResponseSource for SimSource {
    fn item_responses(&self, item_id: &ItemId) -> Result<Vec<(SessionId, f64)>, AuditError> {
        let mut pairs = Vec::new();
        for responses in self.by_competency.values() {
            for response in responses {
                if &response.item_id == item_id {
                    pairs.push((response.session_id.clone(), response.score));
                }
            }
        }
        Ok(pairs)
    }

    fn competency_responses(
        &self,
        competency_id: &CompetencyId,
    ) -> Result<Vec<Response>, AuditError> {
        Ok(self
            .by_competency
            .get(competency_id)
            .cloned()
            .unwrap_or_default())
    }

    fn item_selections(
        &self,
        item_id: &ItemId,
    ) -> Result<Option<FxHashMap<OptionId, u32>>, AuditError> {
        Ok(self.selections.get(item_id).cloned())
    }
}

struct SimCatalog {
    competencies: Vec<CompetencyId>,
    items: FxHashMap<CompetencyId, Vec<ItemId>>,
    options: FxHashMap<ItemId, ItemOptions>,
    traits: FxHashMap<BigFiveTrait, Vec<CompetencyId>>,
}

impl SimCatalog {
    fn new() -> Self {
        Self {
            competencies: Vec::new(),
            items: FxHashMap::default(),
            options: FxHashMap::default(),
            traits: FxHashMap::default(),
        }
    }

    fn add_competency(&mut self, competency: &str, item_count: usize) {
        let id = CompetencyId::from(competency);
        let items = (0..item_count)
            .map(|i| ItemId::new(format!("{competency}-q{i:02}")))
            .collect();
        self.competencies.push(id.clone());
        self.items.insert(id, items);
    }

    fn map_trait(&mut self, trait_name: BigFiveTrait, competencies: &[&str]) {
        self.traits.insert(
            trait_name,
            competencies.iter().map(|c| CompetencyId::from(*c)).collect(),
        );
    }
}

impl ItemCatalog for SimCatalog {
    fn all_competencies(&self) -> Vec<CompetencyId> {
        self.competencies.clone()
    }

    fn competency_items(&self, competency_id: &CompetencyId) -> Vec<ItemId> {
        self.items.get(competency_id).cloned().unwrap_or_default()
    }

    fn item_competency(&self, item_id: &ItemId) -> Option<CompetencyId> {
        self.items
            .iter()
            .find(|(_, items)| items.contains(item_id))
            .map(|(competency, _)| competency.clone())
    }

    fn item_options(&self, item_id: &ItemId) -> Option<ItemOptions> {
        self.options.get(item_id).map(|options| ItemOptions {
            correct: options.correct.clone(),
            distractors: options.distractors.clone(),
        })
    }

    fn trait_competencies(&self, trait_name: BigFiveTrait) -> Vec<CompetencyId> {
        self.traits.get(&trait_name).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// Scenario 1: 60 respondents, abilities from N(0, 1), a known item with
/// a = 1.2, b = 0.0. Calibration recovers the parameters within the
/// stated tolerances.
#[test]
fn test_calibration_recovers_known_item() {
    calibra_core::log::init();
    let true_a = [1.0, 0.9, 1.1, 1.2, 0.8, 1.4, 1.0, 1.3, 1.1, 0.9];
    let true_b = [-1.5, -1.0, -0.5, 0.0, 0.3, 0.6, -0.2, 1.0, 1.5, 0.8];

    let mut source = SimSource::default();
    source.add_competency("calc", simulate_competency("calc", &true_a, &true_b, 60));
    let mut catalog = SimCatalog::new();
    catalog.add_competency("calc", 10);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };

    let summary = run_audit(NOW, &ctx).unwrap();
    assert!(summary.calibrated);
    assert_eq!(summary.items_recalculated, 10);
    assert_eq!(summary.items_failed, 0);

    let (stats, _) = store.load_item(&ItemId::from("calc-q03")).unwrap().unwrap();
    let b = stats.irt_difficulty.expect("difficulty estimated");
    let a = stats.irt_discrimination.expect("discrimination estimated");
    assert!((b - 0.0).abs() < 0.4, "estimated b too far from 0.0: {b}");
    assert!((a - 1.2).abs() < 0.6, "estimated a too far from 1.2: {a}");
    // Guessing stays unestimated.
    assert!(stats.irt_guessing.is_none());
}

/// Scenario 2: an item everyone answers correctly is dropped as extreme;
/// classical statistics still run and flag it as too easy.
#[test]
fn test_all_correct_item_excluded_from_calibration() {
    let mut responses = Vec::new();
    for j in 0..60 {
        let session = SessionId::new(format!("ez-s{j:03}"));
        responses.push(Response::new(
            session,
            ItemId::from("ez-q00"),
            1.0,
        ));
    }
    let mut source = SimSource::default();
    source.add_competency("ez", responses);
    let mut catalog = SimCatalog::new();
    catalog.add_competency("ez", 1);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };

    run_audit(NOW, &ctx).unwrap();

    let (stats, _) = store.load_item(&ItemId::from("ez-q00")).unwrap().unwrap();
    // Zero items survived extreme filtering: no IRT parameters.
    assert!(stats.irt_difficulty.is_none());
    assert!(stats.irt_discrimination.is_none());
    // Classical side still sees the 100% correct rate.
    assert_eq!(stats.difficulty_index, Some(1.0));
    assert_eq!(
        stats.difficulty_flag,
        calibra_core::types::DifficultyFlag::TooEasy
    );
}

/// Scenario 3: a three-item competency engineered to alpha = 0.72 is
/// reliable, and deleting an item lowers alpha, so nothing is recommended
/// for removal.
#[test]
fn test_reliability_and_deletion_recommendation() {
    // Shared signal varies with the respondent's position inside a block
    // of ten; three mutually orthogonal noise vectors vary per block.
    // Chosen scales put Cronbach's Alpha at 0.72 exactly (up to the
    // shared n/(n-1) factor, which cancels in the ratio).
    const V1: [f64; 6] = [-1.0, 0.0, 1.0, -1.0, 0.0, 1.0];
    const V2: [f64; 6] = [1.0, -1.0, 0.0, 0.0, -1.0, 1.0];
    const V3: [f64; 6] = [1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
    let c = 0.19;
    let c3 = c * (2.0f64 / 3.0).sqrt();

    let mut responses = Vec::new();
    for j in 0..60usize {
        let block = j / 10;
        let pos = j % 10;
        let shared = 0.2 + 0.5 * (pos as f64 / 10.0);
        let session = SessionId::new(format!("rel-s{j:03}"));
        let scores = [
            shared + c * V1[block],
            shared + c * V2[block],
            shared + c3 * V3[block],
        ];
        for (i, score) in scores.iter().enumerate() {
            responses.push(Response::new(
                session.clone(),
                ItemId::new(format!("rel-q{i:02}")),
                *score,
            ));
        }
    }

    let mut source = SimSource::default();
    source.add_competency("rel", responses);
    let mut catalog = SimCatalog::new();
    catalog.add_competency("rel", 3);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };
    run_audit(NOW, &ctx).unwrap();

    let reliability = store
        .competency_reliability(&CompetencyId::from("rel"))
        .unwrap()
        .unwrap();
    let alpha = reliability.cronbach_alpha.unwrap();
    assert!(
        (alpha - 0.72).abs() < 0.01,
        "expected alpha near 0.72, got {alpha}"
    );
    assert_eq!(reliability.reliability_status, ReliabilityStatus::Reliable);

    // Every leave-one-out alpha is lower: no removal candidates.
    let full = alpha;
    for (item, &deleted) in &reliability.alpha_if_deleted {
        assert!(
            deleted < full,
            "deleting {item} must not improve a coherent scale ({deleted} >= {full})"
        );
    }
}

/// Scenario 4: manual reactivation of a retired item with negative
/// discrimination is rejected; with non-negative discrimination it goes
/// through and lands in the audit trail.
#[test]
fn test_reactivation_of_toxic_item_rejected() {
    let source = SimSource::default();
    let catalog = SimCatalog::new();
    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };

    let mut stats = ItemStatistics::probation(ItemId::from("q-toxic"), CompetencyId::from("c1"));
    stats.response_count = 60;
    stats.discrimination_index = Some(-0.1);
    stats.validity_status = ValidityStatus::Retired;
    store.insert_item(&stats).unwrap();

    let err = override_status(
        &ItemId::from("q-toxic"),
        ValidityStatus::Active,
        "bring it back",
        NOW,
        &ctx,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AuditError::Status(StatusError::ReactivationBlocked { .. })
    ));

    // Nothing was written; the stored status is unchanged.
    let (unchanged, _) = store.load_item(&ItemId::from("q-toxic")).unwrap().unwrap();
    assert_eq!(unchanged.validity_status, ValidityStatus::Retired);
    assert!(store.status_history(&ItemId::from("q-toxic")).unwrap().is_empty());

    // A repaired item (non-negative discrimination) may come back.
    let mut fixed = ItemStatistics::probation(ItemId::from("q-fixed"), CompetencyId::from("c1"));
    fixed.response_count = 60;
    fixed.discrimination_index = Some(0.1);
    fixed.validity_status = ValidityStatus::Retired;
    store.insert_item(&fixed).unwrap();

    let change = override_status(
        &ItemId::from("q-fixed"),
        ValidityStatus::Active,
        "content reworked after review",
        NOW,
        &ctx,
    )
    .unwrap();
    assert_eq!(change.to, ValidityStatus::Active);
    let history = store.status_history(&ItemId::from("q-fixed")).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].reason.starts_with("manual:"));
}

/// Insufficient data stays insufficient: below 50 respondents nothing is
/// computed, and the item record stays in probation with null metrics.
#[test]
fn test_insufficient_data_is_not_an_error() {
    let true_a = [1.0, 1.0, 1.0];
    let true_b = [-0.5, 0.0, 0.5];
    let mut source = SimSource::default();
    source.add_competency("tiny", simulate_competency("tiny", &true_a, &true_b, 10));
    let mut catalog = SimCatalog::new();
    catalog.add_competency("tiny", 3);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };
    let summary = run_audit(NOW, &ctx).unwrap();
    assert_eq!(summary.items_recalculated, 0);
    assert_eq!(summary.items_skipped, 3);
    assert_eq!(summary.items_failed, 0);

    let (stats, _) = store.load_item(&ItemId::from("tiny-q00")).unwrap().unwrap();
    assert_eq!(stats.response_count, 10);
    assert_eq!(stats.difficulty_index, None);
    assert_eq!(stats.discrimination_index, None);
    assert_eq!(stats.validity_status, ValidityStatus::Probation);

    let reliability = store
        .competency_reliability(&CompetencyId::from("tiny"))
        .unwrap()
        .unwrap();
    assert_eq!(
        reliability.reliability_status,
        ReliabilityStatus::InsufficientData
    );
}

/// Every Big Five trait gets a reliability record, including traits with
/// no mapped competencies.
#[test]
fn test_all_traits_reported() {
    let true_a = [1.0, 1.1, 0.9, 1.2];
    let true_b = [-0.5, 0.0, 0.5, 1.0];
    let mut source = SimSource::default();
    source.add_competency("bf", simulate_competency("bf", &true_a, &true_b, 60));
    let mut catalog = SimCatalog::new();
    catalog.add_competency("bf", 4);
    catalog.map_trait(BigFiveTrait::Openness, &["bf"]);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };
    let summary = run_audit(NOW, &ctx).unwrap();
    assert_eq!(summary.traits_recalculated, 5);

    let openness = store
        .trait_reliability(BigFiveTrait::Openness)
        .unwrap()
        .unwrap();
    assert_eq!(openness.total_items, 4);
    assert_eq!(openness.sample_size, 60);

    // Unmapped trait: present, insufficient data.
    let neuroticism = store
        .trait_reliability(BigFiveTrait::Neuroticism)
        .unwrap()
        .unwrap();
    assert_eq!(
        neuroticism.reliability_status,
        ReliabilityStatus::InsufficientData
    );
    assert_eq!(neuroticism.total_items, 0);
}

/// Manual single-item recalculation: works for known items, rejects
/// unknown ones, and records the previous discrimination snapshot on the
/// next pass.
#[test]
fn test_manual_recalculation_and_snapshot() {
    let true_a = [1.0, 1.1, 0.9, 1.2, 1.0, 1.3];
    let true_b = [-1.0, -0.4, 0.0, 0.4, 1.0, 0.2];
    let mut source = SimSource::default();
    source.add_competency("man", simulate_competency("man", &true_a, &true_b, 60));
    let mut catalog = SimCatalog::new();
    catalog.add_competency("man", 6);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };

    let item = ItemId::from("man-q02");
    recalculate_item(&item, NOW, &ctx).unwrap();
    let (first, _) = store.load_item(&item).unwrap().unwrap();
    assert!(first.discrimination_index.is_some());
    assert!(first.previous_discrimination_index.is_none());

    // Second manual pass snapshots the previous value.
    recalculate_item(&item, NOW + 60, &ctx).unwrap();
    let (second, _) = store.load_item(&item).unwrap().unwrap();
    assert_eq!(
        second.previous_discrimination_index,
        first.discrimination_index
    );

    // Unknown item: explicit not-found rejection.
    let err = recalculate_item(&ItemId::from("man-q99"), NOW, &ctx).unwrap_err();
    assert!(matches!(err, AuditError::ItemNotFound { .. }));
}

/// The review queue surfaces flagged items, worst first.
#[test]
fn test_review_queue_after_audit() {
    let mut responses = Vec::new();
    for j in 0..60 {
        let session = SessionId::new(format!("rev-s{j:03}"));
        let skill = j as f64 / 59.0;
        // q00 and q02 track skill; q01 is inverted (penalizes skilled
        // respondents), with a shallower slope so rest-scores keep
        // variance.
        for (item, score) in [
            ("rev-q00", skill),
            ("rev-q01", 1.0 - 0.5 * skill),
            ("rev-q02", skill),
        ] {
            responses.push(Response::new(session.clone(), ItemId::from(item), score));
        }
    }
    let mut source = SimSource::default();
    source.add_competency("rev", responses);
    let mut catalog = SimCatalog::new();
    catalog.add_competency("rev", 3);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };
    let summary = run_audit(NOW, &ctx).unwrap();
    assert!(summary.status_changes >= 1);

    let (toxic, _) = store.load_item(&ItemId::from("rev-q01")).unwrap().unwrap();
    assert_eq!(toxic.validity_status, ValidityStatus::Retired);

    let history = store.status_history(&ItemId::from("rev-q01")).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].reason.starts_with("auto: negative discrimination"));

    let review = items_requiring_review(&store.all_items().unwrap());
    assert!(!review.is_empty());
    assert_eq!(review[0].item_id, ItemId::from("rev-q01"));
}

/// A second audit run with no new responses skips every item.
#[test]
fn test_unchanged_items_skipped_on_next_run() {
    let true_a = [1.0, 1.1, 0.9, 1.2];
    let true_b = [-0.5, 0.0, 0.5, 1.0];
    let mut source = SimSource::default();
    source.add_competency("rep", simulate_competency("rep", &true_a, &true_b, 60));
    let mut catalog = SimCatalog::new();
    catalog.add_competency("rep", 4);

    let store = SqliteStatisticsStore::open_in_memory().unwrap();
    let config = CalibraConfig::default();
    let ctx = AuditContext {
        source: &source,
        catalog: &catalog,
        store: &store,
        config: &config,
    };

    let first = run_audit(NOW, &ctx).unwrap();
    assert_eq!(first.items_recalculated, 4);

    // Same data an hour later: calibration not due, nothing new.
    let second = run_audit(NOW + 3600, &ctx).unwrap();
    assert!(!second.calibrated);
    assert_eq!(second.items_recalculated, 0);
    assert_eq!(second.items_skipped, 4);
}

/// The parallel audit path produces the same counts as the serial one.
#[test]
fn test_parallel_audit_matches_serial() {
    let true_a = [1.0, 1.1, 0.9, 1.2, 1.3, 0.8];
    let true_b = [-1.0, -0.4, 0.0, 0.4, 0.8, 1.2];
    let responses = simulate_competency("par", &true_a, &true_b, 60);

    let run = |parallel: bool| {
        let mut source = SimSource::default();
        source.add_competency("par", responses.clone());
        let mut catalog = SimCatalog::new();
        catalog.add_competency("par", 6);
        let store = SqliteStatisticsStore::open_in_memory().unwrap();
        let config = CalibraConfig::from_toml(&format!(
            "[audit]\nparallel = {parallel}\n"
        ))
        .unwrap();
        let ctx = AuditContext {
            source: &source,
            catalog: &catalog,
            store: &store,
            config: &config,
        };
        run_audit(NOW, &ctx).unwrap()
    };

    let serial = run(false);
    let parallel = run(true);
    assert_eq!(serial.items_recalculated, parallel.items_recalculated);
    assert_eq!(serial.items_skipped, parallel.items_skipped);
    assert_eq!(serial.status_changes, parallel.status_changes);
}
