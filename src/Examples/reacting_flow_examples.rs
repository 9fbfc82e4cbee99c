use crate::CompressibleSystem::SystemError;
use crate::CompressibleSystem::integration_system::{IntegrationSystem, TimeIntegrator};
use crate::CompressibleSystem::reacting_system::ReactingCompressibleSystem;
use crate::Radiation::radiation_model::RadiationModel;
use crate::settings::{RunSettings, SystemSettings};
use log::{error, info, warn};

const SOD_TUBE: &str = r#"{
    "mesh": { "divisions": [200, 1, 1], "lengths": [1.0, 0.01, 0.01] },
    "integration": "SspRk3",
    "run": { "end_time": 5e-4, "cfl": 0.5 },
    "thermo": {
        "type": "CaloricallyPerfectGas", "specie": "air", "W": 28.96, "cv": 718.0,
        "transport": { "Constant": { "mu": 0.0, "Pr": 0.7 } }
    },
    "flux_scheme": "Hll",
    "initial": {
        "p": 1e4, "T": 278.0,
        "regions": [ { "min": [0.0, 0.0, 0.0], "max": [0.5, 1.0, 1.0], "p": 1e5, "T": 348.0 } ]
    }
}"#;

const REACTING_BOX: &str = r#"{
    "mesh": { "divisions": [40, 1, 1], "lengths": [0.2, 0.01, 0.01], "periodic": [true, false, false] },
    "integration": "SspRk2",
    "run": { "end_time": 2e-4, "cfl": 0.4, "max_steps": 5000 },
    "thermo": {
        "type": "PerfectGasMixture",
        "species": [
            { "name": "F", "W": 2.0, "cv": 10000.0 },
            { "name": "O", "W": 32.0, "cv": 650.0 },
            { "name": "P", "W": 34.0, "cv": 700.0 },
            { "name": "N2", "W": 28.0, "cv": 740.0 }
        ],
        "transport": { "Sutherland": { "As": 1.458e-6, "Ts": 110.4, "Pr": 0.7 } }
    },
    "inert_specie": "N2",
    "turbulence": { "type": "ConstantEddyViscosity", "nut": 1e-4, "Prt": 0.85 },
    "combustion": { "reactions": [ { "eq": "F + O => P", "A": 1e9, "n": 0.0, "E": 1e5, "Q": 2e8 } ] },
    "radiation": { "type": "OpticallyThinGrey", "absorption": 0.5, "T_ambient": 300.0 },
    "linear_solver": { "type": "GaussSeidel", "tolerance": 1e-9, "max_iterations": 200, "strict": true },
    "initial": {
        "p": 1e5, "T": 300.0, "Y": { "F": 0.02, "O": 0.3 },
        "regions": [ { "min": [0.08, 0.0, 0.0], "max": [0.12, 1.0, 1.0], "T": 1500.0 } ]
    }
}"#;

/// largest number of step halvings before a failure is given up on
const MAX_HALVINGS: usize = 6;

/// Advances one accepted step. A failed step is rolled back, the histories are cleared and the
/// step is retried with half the time step. Returns the step actually taken. When every retry
/// fails the system is left at the accepted state it started from.
pub fn advance_with_retry(
    system: &mut ReactingCompressibleSystem,
    integrator: &TimeIntegrator,
    dt: f64,
) -> Result<f64, SystemError> {
    let snapshot = system.snapshot();
    let mut dt = dt;
    let mut halvings = 0;
    loop {
        match integrator.advance(system, dt) {
            Ok(()) => return Ok(dt),
            Err(e) => {
                system.restore(&snapshot);
                system.clear_ode_fields();
                if halvings == MAX_HALVINGS {
                    return Err(e);
                }
                warn!("step of {:e} s failed ({}), retrying with {:e} s", dt, e, 0.5 * dt);
                dt *= 0.5;
                halvings += 1;
            }
        }
    }
}

/// Marches to `end_time` with Courant-limited steps. Returns the number of steps taken.
pub fn run_to_end(
    system: &mut ReactingCompressibleSystem,
    integrator: &TimeIntegrator,
    run: &RunSettings,
) -> Result<usize, SystemError> {
    let mut time = 0.0;
    let mut steps = 0;
    while time < run.end_time && steps < run.max_steps {
        let dt = system.courant_time_step(run.cfl)?.min(run.end_time - time);
        time += advance_with_retry(system, integrator, dt)?;
        steps += 1;
        if steps % 50 == 0 {
            info!("step {}, time = {:e} s", steps, time);
        }
    }
    info!("reached time = {:e} s in {} steps", time, steps);
    Ok(steps)
}

fn sod_shock_tube() -> Result<(), SystemError> {
    let settings = SystemSettings::from_json_str(SOD_TUBE)?;
    let mesh = settings.build_mesh()?;
    let g = settings.gravity();
    let mut system = settings.build_system(&mesh, &g)?;
    let integrator = TimeIntegrator::new(settings.integration);
    run_to_end(&mut system, &integrator, &settings.run)?;
    system.pretty_print_summary();
    let (mass, _, energy) = system.state().totals(&mesh);
    println!("total mass {:e} kg, total energy {:e} J", mass, energy);
    // density profile, every tenth cell
    for c in (0..mesh.n_cells()).step_by(10) {
        println!(
            "x = {:.3}  rho = {:.5}  U = {:.3}  p = {:.1}",
            mesh.centres[c].x,
            system.state().rho.internal[c],
            system.state().U.internal[c].x,
            system.thermo().p().internal[c]
        );
    }
    Ok(())
}

fn reacting_box() -> Result<(), SystemError> {
    let settings = SystemSettings::from_json_str(REACTING_BOX)?;
    let mesh = settings.build_mesh()?;
    let g = settings.gravity();
    let mut system = settings.build_system(&mesh, &g)?;
    system.thermo().composition().pretty_print();
    let integrator = TimeIntegrator::new(settings.integration);
    let (mass0, _, _) = system.state().totals(&mesh);
    run_to_end(&mut system, &integrator, &settings.run)?;
    system.pretty_print_summary();
    let (mass, _, _) = system.state().totals(&mesh);
    println!("relative mass change {:e}", (mass - mass0) / mass0);
    let sh = system.correct_radiation();
    let (sh_min, _) = sh.min_max();
    println!(
        "{} radiation: strongest cooling {:e} W/m3",
        system.radiation().name(),
        sh_min
    );
    println!(
        "steps with clamping in a row at the end: {}",
        system.monitor().consecutive_clamped_steps
    );
    let restart = system.restart_fields()?;
    if let Some(fields) = restart.as_object() {
        println!("restart fields: {:?}", fields.keys().collect::<Vec<_>>());
    }
    Ok(())
}

pub fn reacting_flow_examples(task: usize) {
    let result = match task {
        0 => sod_shock_tube(),
        1 => reacting_box(),
        _ => {
            error!("no example with number {}", task);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!("example {} failed: {}", task, e);
    }
}
