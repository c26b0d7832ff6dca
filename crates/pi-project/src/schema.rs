use serde::{Deserialize, Serialize};

/// Current scenario file format version.
pub const SCENARIO_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCENARIO_VERSION
}

fn default_setpoint() -> SignalDef {
    SignalDef::Constant { value: 1.0 }
}

/// A complete, self-contained description of one loop simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub params: ParamsDef,
    #[serde(default)]
    pub initial: InitialStateDef,
    #[serde(default = "default_setpoint")]
    pub setpoint: SignalDef,
    #[serde(default)]
    pub load: SignalDef,
    #[serde(default)]
    pub horizon: HorizonDef,
    #[serde(default)]
    pub solver: SolverDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParamsDef {
    pub c_p: f64,
    pub t_cl: f64,
    pub t_n: f64,
    pub u_min: f64,
    pub u_max: f64,
    pub use_ref: bool,
    pub adapt_t: bool,
}

impl Default for ParamsDef {
    fn default() -> Self {
        Self {
            c_p: 1.0,
            t_cl: 0.5,
            t_n: 1.5,
            u_min: -1.0,
            u_max: 1.0,
            use_ref: false,
            adapt_t: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct InitialStateDef {
    pub x: f64,
    pub u_raw: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SignalDef {
    Constant {
        value: f64,
    },
    Step {
        at_s: f64,
        #[serde(default)]
        before: f64,
        after: f64,
    },
    Schedule {
        #[serde(default)]
        initial: f64,
        events: Vec<SignalEventDef>,
    },
    Table {
        points: Vec<[f64; 2]>,
    },
}

impl Default for SignalDef {
    fn default() -> Self {
        SignalDef::Constant { value: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalEventDef {
    pub time_s: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HorizonDef {
    pub t_end_s: f64,
    pub samples: usize,
}

impl Default for HorizonDef {
    fn default() -> Self {
        Self {
            t_end_s: 20.0,
            samples: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SolverMethodDef {
    #[default]
    Dopri5,
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub method: SolverMethodDef,
    pub rtol: f64,
    pub atol: f64,
    pub dt_s: f64,
    pub max_steps: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            method: SolverMethodDef::Dopri5,
            rtol: 1e-6,
            atol: 1e-9,
            dt_s: 1e-3,
            max_steps: 100_000,
        }
    }
}

impl Scenario {
    /// Scenario with default loop parameters, a unit setpoint and no load.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCENARIO_VERSION,
            name: name.into(),
            params: ParamsDef::default(),
            initial: InitialStateDef::default(),
            setpoint: default_setpoint(),
            load: SignalDef::default(),
            horizon: HorizonDef::default(),
            solver: SolverDef::default(),
        }
    }

    /// Setpoint step to 1.0 at 2 s, then a load step to 0.5 at 10 s.
    pub fn step_response() -> Self {
        Self {
            setpoint: SignalDef::Step {
                at_s: 2.0,
                before: 0.0,
                after: 1.0,
            },
            load: SignalDef::Step {
                at_s: 10.0,
                before: 0.0,
                after: 0.5,
            },
            ..Self::new("step-response")
        }
    }

    /// Unsaturated unit setpoint over 10 s, used to compare the two
    /// integral error modes.
    pub fn integral_demo() -> Self {
        Self {
            params: ParamsDef {
                t_n: 1.0,
                u_min: -1.0e3,
                u_max: 1.0e3,
                ..ParamsDef::default()
            },
            horizon: HorizonDef {
                t_end_s: 10.0,
                samples: 1000,
            },
            ..Self::new("integral-demo")
        }
    }
}
