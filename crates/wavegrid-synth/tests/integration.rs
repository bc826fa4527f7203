//! Integration tests for wavegrid-synth crate.
//!
//! Tests cover the engine contract across all four algorithms, envelope
//! bounds, the control path from JSON messages through the block processor,
//! and the experiment post chain.

use proptest::prelude::*;
use std::sync::Arc;
use wavegrid_core::{LookupTable, ParamBlock, ParamValue, TAU};
use wavegrid_synth::{
    AdditiveEngine, Adsr, ControlMessage, Convolver, Engine, EngineKind, EnvelopeStage,
    ExperimentChain, FmEngine, SLEW_LIMIT, SynthEngine, WaveshaperEngine, WavetableGridEngine,
    processor,
};

const SR: f64 = 48000.0;

fn tanh_table() -> Arc<LookupTable> {
    let table = LookupTable::from_fn([64, 4, 4], |i0, i1, i2| {
        let t = i0 as f32 / 63.0 * 2.0 - 1.0;
        (t * (1.0 + i1 as f32)).tanh() * (1.0 - i2 as f32 * 0.2)
    })
    .unwrap();
    Arc::new(table)
}

fn engine_of(kind: EngineKind) -> Engine {
    match kind {
        EngineKind::Additive => AdditiveEngine::new(SR).into(),
        EngineKind::Fm => FmEngine::new(SR).into(),
        EngineKind::Waveshaper => WaveshaperEngine::new(SR, tanh_table()).into(),
        EngineKind::WavetableGrid => WavetableGridEngine::new(SR, tanh_table()).into(),
    }
}

fn render(engine: &mut impl SynthEngine, blocks: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; blocks * 128];
    for chunk in out.chunks_mut(128) {
        engine.process(&ParamBlock::empty(), chunk);
    }
    out
}

// ---------------------------------------------------------------------------
// 1. Engine contract
// ---------------------------------------------------------------------------

#[test]
fn every_engine_is_silent_before_note_on() {
    for kind in EngineKind::ALL {
        let mut engine = engine_of(kind);
        assert_eq!(engine.kind(), kind);
        assert!(!engine.is_active(), "{kind} active before note_on");
        let out = render(&mut engine, 4);
        assert!(out.iter().all(|&s| s == 0.0), "{kind} not silent");
    }
}

#[test]
fn every_engine_sounds_after_note_on_and_stays_finite() {
    for kind in EngineKind::ALL {
        let mut engine = engine_of(kind);
        engine.note_on(57);
        assert!(engine.is_active(), "{kind} inactive after note_on");
        let out = render(&mut engine, 40);
        assert!(out.iter().all(|s| s.is_finite()), "{kind} produced non-finite output");
        assert!(out.iter().any(|&s| s != 0.0), "{kind} is silent");
    }
}

#[test]
fn every_engine_goes_inactive_after_note_off() {
    for kind in EngineKind::ALL {
        let mut engine = engine_of(kind);
        engine.note_on(60);
        render(&mut engine, 40);
        engine.note_off();
        // Long enough for the FM release and the wavetable gain ramp
        render(&mut engine, 2000);
        assert!(!engine.is_active(), "{kind} still active");
        let tail = render(&mut engine, 2);
        assert!(tail.iter().all(|&s| s == 0.0), "{kind} tail not silent");
    }
}

#[test]
fn descriptors_match_stored_params() {
    for kind in EngineKind::ALL {
        let engine = engine_of(kind);
        let descs = engine.parameter_descriptors();
        assert!(!descs.is_empty());
        for (i, d) in descs.iter().enumerate() {
            assert_eq!(engine.param(i), Some(d.default_value), "{kind} param {}", d.name);
        }
        assert_eq!(engine.param(descs.len()), None);
    }
}

#[test]
fn unknown_param_index_is_ignored() {
    let mut engine = engine_of(EngineKind::Fm);
    engine.set_param(1000, 1.0);
    assert_eq!(engine.param(1000), None);
}

#[test]
fn note_69_is_exactly_440() {
    let mut fm = FmEngine::new(SR);
    fm.note_on(69);
    assert_eq!(fm.note_frequency(), 440.0);

    let mut additive = AdditiveEngine::new(SR);
    additive.note_on(69);
    assert_eq!(additive.note_frequency(), 440.0);
}

// ---------------------------------------------------------------------------
// 2. Algorithms
// ---------------------------------------------------------------------------

#[test]
fn additive_single_partial_is_pure_sine() {
    let mut engine = AdditiveEngine::new(SR);
    engine.set_param(0, 1.0);
    engine.set_param(1, 1.0);
    engine.note_on(69);
    let out = render(&mut engine, 4);
    for (n, &s) in out.iter().enumerate() {
        let expected = (TAU * 440.0 * (n + 1) as f64 / SR).sin();
        assert!((f64::from(s) - expected).abs() < 1e-5, "sample {n}");
    }
}

#[test]
fn fm_without_modulators_is_enveloped_sine() {
    let mut fm = FmEngine::new(SR);
    fm.note_on(69);
    let out = render(&mut fm, 8);

    let mut env = Adsr::new(SR);
    env.set_params(0.01, 0.1, 0.0, 0.2);
    env.attack();
    for (n, &s) in out.iter().enumerate() {
        let phase = TAU * 440.0 * n as f64 / SR;
        let expected = env.process() * 0.7 * phase.sin();
        assert!((f64::from(s) - expected).abs() < 1e-4, "sample {n}");
    }
}

#[test]
fn wavetable_grid_on_zero_table_is_zero() {
    let zeros = LookupTable::new(vec![0.0; 8 * 2 * 2], [8, 2, 2]).unwrap();
    let mut engine = WavetableGridEngine::new(SR, Arc::new(zeros));
    engine.note_on(72);
    let out = render(&mut engine, 20);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn wavetable_grid_host_lanes_override_ramps() {
    let mut engine = WavetableGridEngine::new(SR, tanh_table());
    let gain = [0.0f64; 128];
    let lanes = [
        Some(ParamValue::Constant(0.5)),
        Some(ParamValue::Constant(0.5)),
        Some(ParamValue::PerSample(&gain)),
        Some(ParamValue::Constant(220.0)),
    ];
    engine.note_on(60);
    let mut out = [1.0f32; 128];
    engine.process(&ParamBlock::new(&lanes), &mut out);
    assert!(out.iter().all(|&s| s == 0.0));
}

// ---------------------------------------------------------------------------
// 3. Envelope properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn envelope_bounded_and_slew_limited(
        attack in 0.0f64..1.0,
        decay in 0.0f64..1.0,
        sustain in 0.0f64..1.0,
        release in 0.0f64..1.0,
        gate in 1usize..3000,
        retrigger in 0usize..2000,
    ) {
        let mut env = Adsr::new(SR);
        env.set_params(attack, decay, sustain, release);
        env.attack();

        let mut last = 0.0;
        for n in 0..gate + 3000 {
            if n == gate {
                env.release();
            }
            if n == gate + retrigger {
                env.attack();
            }
            let v = env.process();
            prop_assert!((0.0..=1.0).contains(&v));
            prop_assert!((v - last).abs() <= SLEW_LIMIT + 1e-12);
            last = v;
        }
    }
}

#[test]
fn zero_time_envelope_targets_one_immediately() {
    let mut env = Adsr::new(SR);
    env.set_params(0.0, 0.0, 0.5, 0.0);
    env.attack();
    env.process();
    assert_eq!(env.stage_value(), 0.0);
    env.process();
    assert_eq!(env.stage_value(), 1.0);
    assert_eq!(env.stage(), EnvelopeStage::Attack);
}

// ---------------------------------------------------------------------------
// 4. Control path
// ---------------------------------------------------------------------------

#[test]
fn json_messages_drive_installed_engine() {
    let (mut handle, mut audio) = processor::<Engine>(16);
    let messages = [
        r#"{"type":"set_param","index":1,"value":0.9}"#,
        r#"{"type":"note_on","note":69}"#,
    ];
    for json in messages {
        let msg: ControlMessage = serde_json::from_str(json).unwrap();
        handle.sender().send(msg).unwrap();
    }

    handle.install(engine_of(EngineKind::Fm)).unwrap();
    let mut block = [0.0f32; 128];
    audio.process(&ParamBlock::empty(), &mut block);

    let engine = audio.engine().unwrap();
    assert_eq!(engine.param(1), Some(0.9));
    assert!(engine.is_active());
    assert!(block.iter().any(|&s| s != 0.0));
}

#[test]
fn absurd_fm_tuning_renders_a_block() {
    let (mut handle, mut audio) = processor::<Engine>(16);
    handle.install(engine_of(EngineKind::Fm)).unwrap();
    handle.sender().set_param(0, 1e19).unwrap();
    handle.sender().note_on(69).unwrap();

    let mut block = [0.0f32; 128];
    for _ in 0..4 {
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }
    assert!(audio.engine().unwrap().is_active());
}

#[test]
fn unknown_message_type_is_rejected() {
    let parsed = serde_json::from_str::<ControlMessage>(r#"{"type":"pitch_bend","value":1}"#);
    assert!(parsed.is_err());
}

// ---------------------------------------------------------------------------
// 5. Experiment chain
// ---------------------------------------------------------------------------

#[test]
fn experiment_chain_after_wavetable_grid() {
    let mut engine = WavetableGridEngine::new(SR, tanh_table());
    let ir: Vec<f32> = (0..4800).map(|n| 0.999f32.powi(n)).collect();
    let mut chain = ExperimentChain::new(SR, Some(Convolver::normalized(&ir, 128)));
    chain.set_pad(0.25, 0.75);
    engine.note_on(48);

    let mut block = [0.0f32; 128];
    let mut energy = 0.0f32;
    for _ in 0..200 {
        engine.process(&ParamBlock::empty(), &mut block);
        chain.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
        energy += block.iter().map(|s| s * s).sum::<f32>();
    }
    assert!(energy > 0.0);
}
