//! End-to-end persistence: save, load, migrate, and fold a run.

use game_core::tables::BalanceTables;
use game_core::{NullPresenter, ShopState, SkillId};
use runtime::{FileProfileStore, Profile, ProfileStore, Session};

#[test]
fn profile_survives_a_full_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saves/profile.json");

    let store = FileProfileStore::new(&path).unwrap();
    let mut profile = Profile::default();
    profile.high_score = 123_456;
    profile.max_wave = 18;
    profile.coins = 900;
    profile.shards = 41;
    profile.locale = "ko".to_string();
    profile.tutorial_completed = true;
    profile.toggles.low_power_mode = true;
    profile.achievements.counters.total_kills = 2048;
    profile.achievements.unlocked.insert("centurion".to_string());
    profile.shop.damage_level = 3;
    profile.skill_state.set(SkillId::Rebound, 2);
    store.save(&profile).unwrap();

    let reloaded = FileProfileStore::new(&path).unwrap().load().unwrap();
    assert_eq!(reloaded, Some(profile));
}

#[test]
fn legacy_v2_save_migrates_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(
        &path,
        r#"{
            "version": 2,
            "highScore": 5000,
            "maxWave": 9,
            "coins": 120,
            "totalKills": 50,
            "tutorialCompleted": true,
            "skills": { "scatter": 1 }
        }"#,
    )
    .unwrap();

    let store = FileProfileStore::new(&path).unwrap();
    let profile = store.load().unwrap().unwrap();
    assert_eq!(profile.version, runtime::CURRENT_VERSION);
    assert_eq!(profile.high_score, 5000);
    assert_eq!(profile.achievements.counters.total_kills, 50);
    assert_eq!(profile.skill_state.level(SkillId::Scatter), 1);
    assert_eq!(profile.shop, ShopState::default());

    // Saving writes the current format; the next load needs no migration.
    store.save(&profile).unwrap();
    assert_eq!(store.load().unwrap(), Some(profile));
}

#[test]
fn session_persists_run_results_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");

    let summary = {
        let store = FileProfileStore::new(&path).unwrap();
        let mut session = Session::open(store, BalanceTables::default());
        let mut sim = session.start_run(99);
        let mut presenter = NullPresenter;
        for _ in 0..200_000 {
            if sim.ended().is_some() {
                break;
            }
            if let Some(offer) = sim.skill_offer() {
                sim.choose_skill(offer.candidates[0], &mut presenter)
                    .unwrap();
            }
            sim.tick(16, &mut presenter);
        }
        let summary = sim.summary().expect("unattended run should end");
        session.finish_run(&summary, 99);
        summary
    };

    let store = FileProfileStore::new(&path).unwrap();
    let session = Session::open(store, BalanceTables::default());
    assert_eq!(session.profile().high_score, summary.score);
    assert_eq!(session.profile().max_wave, summary.wave);
    assert_eq!(
        session.profile().achievements.counters.total_kills,
        summary.tally.kills
    );
}
