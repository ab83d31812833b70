//! Instructions accepted by the simulation thread.
//!
//! Batches are executed strictly in order. The instruction set is closed:
//! anything that does not decode into one of these variants is rejected at
//! decode time and never reaches the engine.
//!
//! Wire form (JSON array), matching what the control side sends:
//!
//! ```json
//! [
//!   { "method": "resize", "parameters": [64] },
//!   { "method": "initializeData" },
//!   { "method": "render" },
//!   { "property": "beta", "value": 1.25 }
//! ]
//! ```
//!
//! The surface handoff carries a live object and has no wire form.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::config::MIN_COMMAND_BETA;
use crate::error::{Result, SimError};
use crate::lattice::LatticeSize;
use crate::surface::Surface;

/// One-time transfer of a drawable target plus initial lattice dimensions.
pub struct SurfaceHandoff {
    pub surface: Box<dyn Surface>,
    pub width: usize,
    pub height: usize,
}

impl SurfaceHandoff {
    pub fn new<S: Surface + 'static>(surface: S, size: LatticeSize) -> Self {
        Self {
            surface: Box::new(surface),
            width: size.side(),
            height: size.side(),
        }
    }

    /// Validate the dimensions: square, side in the size set.
    pub fn lattice_size(&self) -> Result<LatticeSize> {
        if self.width != self.height {
            return Err(SimError::NonSquare {
                width: self.width,
                height: self.height,
            });
        }
        LatticeSize::try_from(self.width)
    }
}

impl fmt::Debug for SurfaceHandoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandoff")
            .field("surface", &self.surface.size())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Engine operations reachable over the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Resize(LatticeSize),
    InitializeData,
    Play,
    Pause,
    Step,
    Render,
    Reset,
}

impl Method {
    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Resize(_) => "resize",
            Method::InitializeData => "initializeData",
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Step => "step",
            Method::Render => "render",
            Method::Reset => "reset",
        }
    }

    /// Decode a method name and its positional parameters.
    pub fn parse(name: &str, parameters: &[Value]) -> Result<Self> {
        let method = match name {
            "resize" => return Self::parse_resize(parameters),
            "initializeData" => Method::InitializeData,
            "play" => Method::Play,
            "pause" => Method::Pause,
            "step" => Method::Step,
            "render" => Method::Render,
            "reset" => Method::Reset,
            other => return Err(SimError::UnknownMethod(other.to_string())),
        };
        if !parameters.is_empty() {
            return Err(SimError::BadParameters {
                method: method.name(),
                expected: "no parameters",
                got: format!("{} parameter(s)", parameters.len()),
            });
        }
        Ok(method)
    }

    fn parse_resize(parameters: &[Value]) -> Result<Self> {
        match parameters {
            [Value::Number(n)] => match n.as_i64() {
                Some(side) => Ok(Method::Resize(LatticeSize::from_side(side)?)),
                None => Err(SimError::BadParameters {
                    method: "resize",
                    expected: "one integer",
                    got: n.to_string(),
                }),
            },
            other => Err(SimError::BadParameters {
                method: "resize",
                expected: "one integer",
                got: format!("{:?}", other),
            }),
        }
    }
}

/// Engine properties reachable over the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Property {
    Beta(f64),
}

impl Property {
    /// Validated inverse temperature: `>= 0.5` or `+∞`.
    pub fn beta(value: f64) -> Result<Self> {
        if value.is_nan() || value < MIN_COMMAND_BETA {
            return Err(SimError::InvalidBeta(value));
        }
        Ok(Property::Beta(value))
    }

    /// Decode a property name and its JSON value.
    ///
    /// JSON has no infinity, so `beta` also accepts `null` (what
    /// `JSON.stringify` emits for `Infinity`) and the strings `"inf"`,
    /// `"infinity"`, `"Infinity"`.
    pub fn parse(name: &str, value: &Value) -> Result<Self> {
        match name {
            "beta" => {
                let beta = match value {
                    Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                    Value::Null => f64::INFINITY,
                    Value::String(s) if matches!(s.as_str(), "inf" | "infinity" | "Infinity") => {
                        f64::INFINITY
                    }
                    _ => f64::NAN,
                };
                Self::beta(beta)
            }
            other => Err(SimError::UnknownProperty(other.to_string())),
        }
    }
}

/// One entry of a batch.
#[derive(Debug)]
pub enum Instruction {
    Handoff(SurfaceHandoff),
    Invoke(Method),
    SetProperty(Property),
}

/// An ordered batch; executed front to back.
pub type Batch = Vec<Instruction>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireInstruction {
    Invoke {
        method: String,
        #[serde(default)]
        parameters: Vec<Value>,
    },
    SetProperty {
        property: String,
        value: Value,
    },
}

impl Instruction {
    /// Decode a single JSON instruction object.
    pub fn decode(value: Value) -> Result<Self> {
        let shape = value.to_string();
        let wire: WireInstruction =
            serde_json::from_value(value).map_err(|_| SimError::UnrecognizedShape(shape))?;
        match wire {
            WireInstruction::Invoke { method, parameters } => {
                Method::parse(&method, &parameters).map(Instruction::Invoke)
            }
            WireInstruction::SetProperty { property, value } => {
                Property::parse(&property, &value).map(Instruction::SetProperty)
            }
        }
    }
}

/// Decode a JSON batch.
///
/// The text must be a JSON array. Entries that fail to decode are logged
/// and skipped; the rest keep their relative order.
pub fn decode_batch(json: &str) -> Result<Batch> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    let batch = entries
        .into_iter()
        .filter_map(|entry| match Instruction::decode(entry) {
            Ok(instruction) => Some(instruction),
            Err(err) => {
                log::warn!("dropping instruction: {}", err);
                None
            }
        })
        .collect();
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> Result<Instruction> {
        Instruction::decode(v)
    }

    #[test]
    fn test_decode_methods() {
        assert!(matches!(
            decode(json!({"method": "resize", "parameters": [64]})),
            Ok(Instruction::Invoke(Method::Resize(LatticeSize::N64)))
        ));
        assert!(matches!(
            decode(json!({"method": "initializeData"})),
            Ok(Instruction::Invoke(Method::InitializeData))
        ));
        assert!(matches!(
            decode(json!({"method": "play", "parameters": []})),
            Ok(Instruction::Invoke(Method::Play))
        ));
        for name in ["pause", "step", "render", "reset"] {
            let ins = decode(json!({ "method": name })).expect("decodes");
            match ins {
                Instruction::Invoke(m) => assert_eq!(m.name(), name),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_reject_bad_resize() {
        for params in [json!([0]), json!([-64]), json!([100]), json!([64.5]), json!([]), json!([32, 64]), json!(["64"])] {
            let res = decode(json!({"method": "resize", "parameters": params.clone()}));
            assert!(res.is_err(), "accepted resize {:?}", params);
        }
        assert!(matches!(
            decode(json!({"method": "resize", "parameters": [48]})),
            Err(SimError::InvalidSize(48))
        ));
    }

    #[test]
    fn test_reject_unknown_and_surplus() {
        assert!(matches!(
            decode(json!({"method": "cluster"})),
            Err(SimError::UnknownMethod(_))
        ));
        assert!(matches!(
            decode(json!({"method": "play", "parameters": [1]})),
            Err(SimError::BadParameters { .. })
        ));
        assert!(matches!(
            decode(json!({"property": "gamma", "value": 1})),
            Err(SimError::UnknownProperty(_))
        ));
        assert!(matches!(
            decode(json!({"canvas": {}, "width": 32, "height": 32})),
            Err(SimError::UnrecognizedShape(_))
        ));
        assert!(matches!(decode(json!(7)), Err(SimError::UnrecognizedShape(_))));
    }

    #[test]
    fn test_beta_values() {
        assert!(matches!(
            decode(json!({"property": "beta", "value": 1.25})),
            Ok(Instruction::SetProperty(Property::Beta(b))) if b == 1.25
        ));
        for inf in [json!(null), json!("inf"), json!("Infinity")] {
            assert!(matches!(
                decode(json!({"property": "beta", "value": inf})),
                Ok(Instruction::SetProperty(Property::Beta(b))) if b.is_infinite()
            ));
        }
        assert!(Property::beta(0.5).is_ok());
        assert!(Property::beta(0.49).is_err());
        assert!(Property::beta(-1.0).is_err());
        assert!(Property::beta(f64::NAN).is_err());
        assert!(decode(json!({"property": "beta", "value": "hot"})).is_err());
    }

    #[test]
    fn test_decode_batch_keeps_order_and_skips_bad() {
        let batch = decode_batch(
            r#"[
                {"method": "pause"},
                {"method": "resize", "parameters": [3]},
                {"method": "step"},
                {"bogus": true},
                {"method": "render"}
            ]"#,
        )
        .expect("valid array");
        let names: Vec<_> = batch
            .iter()
            .map(|i| match i {
                Instruction::Invoke(m) => m.name(),
                _ => "other",
            })
            .collect();
        assert_eq!(names, ["pause", "step", "render"]);

        assert!(matches!(decode_batch("{\"method\": \"play\"}"), Err(SimError::Decode(_))));
        assert!(decode_batch("not json").is_err());
    }

    #[test]
    fn test_handoff_dimensions() {
        use crate::surface::MemorySurface;
        let h = SurfaceHandoff::new(MemorySurface::new(512, 512), LatticeSize::N128);
        assert_eq!(h.lattice_size().unwrap(), LatticeSize::N128);
        let h = SurfaceHandoff {
            surface: Box::new(MemorySurface::new(512, 512)),
            width: 32,
            height: 64,
        };
        assert!(matches!(h.lattice_size(), Err(SimError::NonSquare { .. })));
        let h = SurfaceHandoff {
            surface: Box::new(MemorySurface::new(512, 512)),
            width: 30,
            height: 30,
        };
        assert!(h.lattice_size().is_err());
    }
}
