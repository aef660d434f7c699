use heightsim::pipeline::{execute_with_callbacks, validate, FrameSink, LastFrame, Simulation, SimulationError};
use heightsim::terrain::Grid;
use heightsim::{decode_pipeline, DecodeError};

const PIPELINE: &str = r#"{
    "totalFrames": 4,
    "step0": { "method": "cone", "radius": 20.0, "height": 30.0 },
    "jobs": [
        { "id": "rain", "name": "Rain", "startFrame": 1, "endFrame": 4, "type": "hydraulic",
          "config": { "numParticles": 400, "erosionRadius": 2, "seed": 42 } },
        { "id": "settle", "name": "Settle", "startFrame": 3, "endFrame": 4, "type": "thermal",
          "config": { "talusAngle": 0.6 } }
    ]
}"#;

struct Recorder {
    frames: Vec<i32>,
    masses: Vec<f64>,
}

impl FrameSink for Recorder {
    fn accept(&mut self, frame: i32, grid: &Grid) {
        self.frames.push(frame);
        self.masses.push(grid.total_mass());
    }
}

#[test]
fn decode_validate_and_run() {
    let simulation = Simulation::from_json(PIPELINE).unwrap();
    assert_eq!(
        simulation.validation().warnings,
        vec!["Jobs 'Rain' and 'Settle' overlap on frames 3-4".to_string()]
    );

    let mut recorder = Recorder {
        frames: Vec::new(),
        masses: Vec::new(),
    };
    let (grid, report) = simulation.run(48, 48, &mut recorder).unwrap();

    assert_eq!(recorder.frames, vec![0, 1, 2, 3, 4]);
    assert_eq!(report.frames_executed, 4);
    assert_eq!(report.job_applications, 6);
    assert_eq!(report.skipped_applications, 2);
    assert_eq!(report.erosion.particles, 1600);

    let initial = simulation.initial_terrain(48, 48).unwrap();
    assert!(grid.max_height() <= initial.max_height() + 1e-3);
    assert!((recorder.masses[0] - recorder.masses[4]).abs() > 1e-3);
    assert!(grid.cells().iter().all(|h| h.is_finite()));
}

#[test]
fn seeded_runs_match() {
    let simulation = Simulation::from_json(PIPELINE).unwrap();
    let mut a = LastFrame::default();
    let mut b = LastFrame::default();
    simulation.run(32, 32, &mut a).unwrap();
    simulation.run(32, 32, &mut b).unwrap();
    assert_eq!(a.frame, b.frame);
}

#[test]
fn gap_blocks_execution() {
    let json = PIPELINE.replace("\"endFrame\": 4, \"type\": \"hydraulic\"", "\"endFrame\": 1, \"type\": \"hydraulic\"");
    match Simulation::from_json(&json) {
        Err(SimulationError::NotExecutable(result)) => {
            assert!(!result.is_valid);
            assert_eq!(result.uncovered_frames, vec![2]);
        }
        other => panic!("expected a coverage failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn decode_errors_surface_before_execution() {
    let json = PIPELINE.replace("\"thermal\"", "\"volcanic\"");
    match Simulation::from_json(&json) {
        Err(SimulationError::Decode(DecodeError::UnknownJobType(kind))) => assert_eq!(kind, "volcanic"),
        other => panic!("expected an unknown job type, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn creation_order_beats_array_order() {
    let json = r#"{
        "totalFrames": 2,
        "step0": { "method": "flat" },
        "jobs": [
            { "id": "third", "name": "Third", "startFrame": 1, "endFrame": 2, "type": "thermal", "config": {}, "creationIndex": 2 },
            { "id": "first", "name": "First", "startFrame": 1, "endFrame": 2, "type": "thermal", "config": {}, "creationIndex": 0 },
            { "id": "second", "name": "Second", "startFrame": 1, "endFrame": 2, "type": "thermal", "config": {}, "creationIndex": 1 }
        ]
    }"#;
    let config = decode_pipeline(json).unwrap();
    assert!(validate(config.total_frames(), config.jobs()).is_valid);

    let mut grid = config.step0().generate(8, 8).unwrap();
    let started = std::cell::RefCell::new(Vec::new());
    execute_with_callbacks(
        &config,
        &mut grid,
        |_, _| {},
        |job, frame| started.borrow_mut().push((frame, job.id.clone())),
        |_, _| {},
    );

    let started = started.into_inner();
    let ids: Vec<(i32, &str)> = started.iter().map(|(frame, id)| (*frame, id.as_str())).collect();
    assert_eq!(
        ids,
        vec![(1, "first"), (1, "second"), (1, "third"), (2, "first"), (2, "second"), (2, "third")]
    );
}
