use crate::fv::fields::{FieldValue, VolField};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("Stage {stage} is out of range for {scheme:?}, which has {n_stages} stages")]
    StageOutOfRange {
        scheme: IntegrationScheme,
        stage: usize,
        n_stages: usize,
    },
    #[error(
        "History of '{field}' holds {stored} entries at stage {stage}; was clearODEFields skipped?"
    )]
    StageMismatch {
        field: String,
        stage: usize,
        stored: usize,
    },
    #[error("Invalid time step {0}")]
    InvalidTimeStep(f64),
}

/// explicit multi-stage schemes in Shu-Osher form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationScheme {
    #[default]
    Euler,
    SspRk2,
    SspRk3,
}

/// Coefficients of one stage: `Q = Σ a[i] Q(i) - dt Σ b[i] ΔQ(i)`, where `i` runs over the
/// values stored at stages `1..=index`, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub index: usize,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl IntegrationScheme {
    pub fn n_stages(&self) -> usize {
        match self {
            IntegrationScheme::Euler => 1,
            IntegrationScheme::SspRk2 => 2,
            IntegrationScheme::SspRk3 => 3,
        }
    }

    /// coefficients of stage `index`, counted from 1
    pub fn stage(&self, index: usize) -> Result<Stage, IntegrationError> {
        let (a, b) = match (self, index) {
            (_, 1) => (vec![1.0], vec![1.0]),
            (IntegrationScheme::SspRk2, 2) => (vec![0.5, 0.5], vec![0.0, 0.5]),
            (IntegrationScheme::SspRk3, 2) => (vec![0.75, 0.25], vec![0.0, 0.25]),
            (IntegrationScheme::SspRk3, 3) => {
                (vec![1.0 / 3.0, 0.0, 2.0 / 3.0], vec![0.0, 0.0, 2.0 / 3.0])
            }
            _ => {
                return Err(IntegrationError::StageOutOfRange {
                    scheme: *self,
                    stage: index,
                    n_stages: self.n_stages(),
                });
            }
        };
        Ok(Stage { index, a, b })
    }
}

/// what a history buffer needs from a stored quantity: a copy, scaling and `self += a*x`
pub trait Blendable: Clone {
    fn scale(&mut self, a: f64);
    fn axpy(&mut self, a: f64, x: &Self);
}

impl<T: FieldValue> Blendable for VolField<T> {
    fn scale(&mut self, a: f64) {
        VolField::scale(self, a);
    }
    fn axpy(&mut self, a: f64, x: &Self) {
        VolField::axpy(self, a, x);
    }
}

/// Ordered per-stage snapshots of one quantity. Entry 0 is the value at the start of the step.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer<F> {
    name: String,
    entries: Vec<F>,
}

impl<F: Blendable> HistoryBuffer<F> {
    pub fn new(name: &str) -> Self {
        HistoryBuffer {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `current` as the entry of stage `stage` and returns `Σ weights[i] entry[i]`.
    ///
    /// Each stage stores exactly once: the buffer must hold `stage - 1` entries on entry.
    pub fn store_and_blend(
        &mut self,
        current: &F,
        stage: usize,
        weights: &[f64],
    ) -> Result<F, IntegrationError> {
        if stage == 0 || self.entries.len() != stage - 1 || weights.len() != stage {
            return Err(IntegrationError::StageMismatch {
                field: self.name.clone(),
                stage,
                stored: self.entries.len(),
            });
        }
        self.entries.push(current.clone());
        let mut blended = current.clone();
        blended.scale(weights[stage - 1]);
        for (entry, &w) in self.entries[..stage - 1].iter().zip(weights) {
            if w != 0.0 {
                blended.axpy(w, entry);
            }
        }
        Ok(blended)
    }

    /// empties the buffer; a no-op on an empty one
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// old values and increments of one conserved quantity
#[derive(Debug, Clone, PartialEq)]
pub struct StageHistory<F> {
    pub old: HistoryBuffer<F>,
    pub delta: HistoryBuffer<F>,
}

impl<F: Blendable> StageHistory<F> {
    pub fn new(name: &str) -> Self {
        StageHistory {
            old: HistoryBuffer::new(&format!("{}Old", name)),
            delta: HistoryBuffer::new(&format!("delta{}", name)),
        }
    }

    pub fn store_and_blend_old(&mut self, current: &F, stage: &Stage) -> Result<F, IntegrationError> {
        self.old.store_and_blend(current, stage.index, &stage.a)
    }

    pub fn store_and_blend_delta(
        &mut self,
        current: &F,
        stage: &Stage,
    ) -> Result<F, IntegrationError> {
        self.delta.store_and_blend(current, stage.index, &stage.b)
    }

    pub fn clear(&mut self) {
        self.old.clear();
        self.delta.clear();
    }
}

/// A system advanced by `TimeIntegrator`: flux evaluation, staged explicit update, implicit
/// correction once per step and the end-of-step reset.
pub trait IntegrationSystem {
    type Error: From<IntegrationError>;
    /// brings every explicit flux up to date with the current state
    fn update(&mut self) -> Result<(), Self::Error>;
    /// explicit conservative update of one stage
    fn solve(&mut self, stage: &Stage, dt: f64) -> Result<(), Self::Error>;
    /// implicit corrections after the last stage
    fn post_update(&mut self, dt: f64) -> Result<(), Self::Error>;
    /// discards stage histories and scheme caches
    fn clear_ode_fields(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeIntegrator {
    pub scheme: IntegrationScheme,
}

impl TimeIntegrator {
    pub fn new(scheme: IntegrationScheme) -> Self {
        TimeIntegrator { scheme }
    }

    /// One accepted step: all stages, the implicit correction, then `clear_ode_fields`.
    ///
    /// On error the histories are left as they are; the caller decides whether to restore a
    /// previous state, call `clear_ode_fields` and retry.
    pub fn advance<S: IntegrationSystem>(&self, system: &mut S, dt: f64) -> Result<(), S::Error> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(IntegrationError::InvalidTimeStep(dt).into());
        }
        for index in 1..=self.scheme.n_stages() {
            let stage = self.scheme.stage(index)?;
            debug!("{:?} stage {} of {}", self.scheme, index, self.scheme.n_stages());
            system.update()?;
            system.solve(&stage, dt)?;
        }
        system.post_update(dt)?;
        system.clear_ode_fields();
        Ok(())
    }
}
