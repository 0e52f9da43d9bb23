//! Operation registry
//!
//! Maps the operation names used in batch scripts to typed parameter
//! lists and the functions that run them on a region. Parameters arrive
//! as raw script tokens and are converted according to the declared
//! [`ParamType`] before the operation runs.

use crate::{BatchError, BatchResult};
use roikit_core::Region;
use roikit_filter::{HistogramEngine, Snapshot, SpectralFilterEngine, point};
use std::collections::BTreeMap;
use std::fmt;

/// Declared type of an operation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Float,
    Text,
}

impl ParamType {
    /// Convert a raw script token.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidArgument`] if the token does not parse
    /// as this type.
    pub fn parse(self, raw: &str) -> BatchResult<ParamValue> {
        match self {
            ParamType::Int => raw
                .parse()
                .map(ParamValue::Int)
                .map_err(|_| BatchError::InvalidArgument(format!("expected an integer, got {raw:?}"))),
            ParamType::Float => match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(ParamValue::Float(v)),
                _ => Err(BatchError::InvalidArgument(format!(
                    "expected a number, got {raw:?}"
                ))),
            },
            ParamType::Text => Ok(ParamValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Text => "text",
        })
    }
}

/// Converted operation parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Float(f32),
    Text(String),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Text(_) => ParamType::Text,
        }
    }

    pub fn as_int(&self) -> BatchResult<i32> {
        match self {
            ParamValue::Int(v) => Ok(*v),
            other => Err(type_mismatch(ParamType::Int, other)),
        }
    }

    /// Float value; integers widen.
    pub fn as_float(&self) -> BatchResult<f32> {
        match self {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f32),
            other => Err(type_mismatch(ParamType::Float, other)),
        }
    }

    pub fn as_text(&self) -> BatchResult<&str> {
        match self {
            ParamValue::Text(v) => Ok(v),
            other => Err(type_mismatch(ParamType::Text, other)),
        }
    }

    /// Non-negative integer, used for channel indices.
    pub fn as_index(&self) -> BatchResult<usize> {
        let v = self.as_int()?;
        usize::try_from(v)
            .map_err(|_| BatchError::InvalidArgument(format!("expected a non-negative index, got {v}")))
    }
}

fn type_mismatch(expected: ParamType, actual: &ParamValue) -> BatchError {
    BatchError::InvalidArgument(format!(
        "expected a {expected} parameter, got a {}",
        actual.param_type()
    ))
}

/// Function run by a registered operation
pub type OpFn = fn(&mut Region<'_>, &[ParamValue]) -> BatchResult<Vec<Snapshot>>;

/// Registered operation: name, typed parameters and implementation
#[derive(Clone)]
pub struct OpSpec {
    name: String,
    params: Vec<(&'static str, ParamType)>,
    func: OpFn,
}

impl OpSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(&'static str, ParamType)] {
        &self.params
    }

    /// Number of parameters the operation takes from a script.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// One-line usage, e.g. `histogramStretch min:int max:int channel:int`.
    pub fn signature(&self) -> String {
        let mut s = self.name.clone();
        for (name, ty) in &self.params {
            s.push_str(&format!(" {name}:{ty}"));
        }
        s
    }

    /// Convert raw tokens to the declared types.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidArgument`] on a count mismatch or a
    /// token that does not parse.
    pub fn parse_args(&self, raw: &[String]) -> BatchResult<Vec<ParamValue>> {
        if raw.len() != self.params.len() {
            return Err(BatchError::InvalidArgument(format!(
                "{} takes {} parameter(s), got {}",
                self.name,
                self.params.len(),
                raw.len()
            )));
        }
        self.params
            .iter()
            .zip(raw)
            .map(|((name, ty), token)| {
                ty.parse(token).map_err(|e| {
                    BatchError::InvalidArgument(format!("{}: parameter {name}: {e}", self.name))
                })
            })
            .collect()
    }

    /// Parse `raw` and run the operation on `region`.
    pub fn invoke(&self, region: &mut Region<'_>, raw: &[String]) -> BatchResult<Vec<Snapshot>> {
        let args = self.parse_args(raw)?;
        (self.func)(region, &args)
    }
}

impl fmt::Debug for OpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Name-indexed set of operations
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    ops: BTreeMap<String, OpSpec>,
}

impl OpRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in operation.
    pub fn with_defaults() -> Self {
        use ParamType::{Float, Int, Text};

        let mut reg = Self::new();
        reg.register("addGrey", &[("value", Int)], add_grey);
        reg.register("addBrightness", &[("value", Int)], add_brightness);
        reg.register(
            "decreaseBrightness",
            &[("threshold", Int), ("value", Int)],
            decrease_brightness,
        );
        reg.register("binarize", &[("threshold", Int)], binarize);
        reg.register("scale", &[("ratio", Float)], scale);
        reg.register("rotate", &[("angle", Int)], rotate);
        reg.register(
            "histogramEqualization",
            &[("colorspace", Text), ("channel", Int)],
            histogram_equalization,
        );
        reg.register(
            "histogramEqualizationAll",
            &[("colorspace", Text)],
            histogram_equalization_all,
        );
        reg.register(
            "thresholdHistogramEqualization",
            &[("threshold", Int), ("channel", Int)],
            threshold_histogram_equalization,
        );
        reg.register(
            "histogramStretch",
            &[("min", Int), ("max", Int), ("channel", Int)],
            histogram_stretch,
        );
        reg.register(
            "histogramStretchAll",
            &[("min", Int), ("max", Int)],
            histogram_stretch_all,
        );
        reg.register(
            "lowPassFilter",
            &[("colorspace", Text), ("channel", Int), ("radius", Int)],
            low_pass_filter,
        );
        reg.register(
            "highPassFilter",
            &[("colorspace", Text), ("channel", Int), ("radius", Int)],
            high_pass_filter,
        );
        reg.register(
            "bandStopFilter",
            &[
                ("colorspace", Text),
                ("channel", Int),
                ("inner", Int),
                ("outer", Int),
            ],
            band_stop_filter,
        );
        reg.register(
            "sharpenEdge",
            &[
                ("colorspace", Text),
                ("channel", Int),
                ("radius", Int),
                ("factor", Float),
            ],
            sharpen_edge,
        );
        reg
    }

    /// Add or replace an operation. Returns the replaced entry, if any.
    pub fn register(&mut self, name: &str, params: &[(&'static str, ParamType)], func: OpFn) -> Option<OpSpec> {
        let spec = OpSpec {
            name: name.to_string(),
            params: params.to_vec(),
            func,
        };
        self.ops.insert(name.to_string(), spec)
    }

    /// Look up an operation by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::NotFound`] for unregistered names.
    pub fn lookup(&self, name: &str) -> BatchResult<&OpSpec> {
        self.ops
            .get(name)
            .ok_or_else(|| BatchError::NotFound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Registered operations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OpSpec> {
        self.ops.values()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn arg(params: &[ParamValue], index: usize) -> BatchResult<&ParamValue> {
    params
        .get(index)
        .ok_or_else(|| BatchError::InvalidArgument(format!("missing parameter {index}")))
}

fn add_grey(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::add_grey(region, arg(p, 0)?.as_int()?)?;
    Ok(Vec::new())
}

fn add_brightness(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::add_brightness(region, arg(p, 0)?.as_int()?)?;
    Ok(Vec::new())
}

fn decrease_brightness(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::decrease_brightness(region, arg(p, 0)?.as_int()?, arg(p, 1)?.as_int()?)?;
    Ok(Vec::new())
}

fn binarize(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::binarize(region, arg(p, 0)?.as_int()?)?;
    Ok(Vec::new())
}

fn scale(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::scale(region, arg(p, 0)?.as_float()?)?;
    Ok(Vec::new())
}

fn rotate(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    point::rotate(region, arg(p, 0)?.as_int()?)?;
    Ok(Vec::new())
}

fn histogram_equalization(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = HistogramEngine::new(region, arg(p, 0)?.as_text()?)?;
    engine.perform_equalization(arg(p, 1)?.as_index()?)?;
    Ok(engine.take_snapshots())
}

fn histogram_equalization_all(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = HistogramEngine::new(region, arg(p, 0)?.as_text()?)?;
    engine.perform_equalization_all()?;
    Ok(engine.take_snapshots())
}

fn threshold_histogram_equalization(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = HistogramEngine::new(region, "rgb")?;
    engine.perform_threshold_equalization(arg(p, 0)?.as_int()?, arg(p, 1)?.as_index()?)?;
    Ok(engine.take_snapshots())
}

fn histogram_stretch(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = HistogramEngine::new(region, "rgb")?;
    engine.perform_stretch(
        arg(p, 0)?.as_int()?,
        arg(p, 1)?.as_int()?,
        arg(p, 2)?.as_index()?,
    )?;
    Ok(engine.take_snapshots())
}

fn histogram_stretch_all(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = HistogramEngine::new(region, "rgb")?;
    engine.perform_stretch_all(arg(p, 0)?.as_int()?, arg(p, 1)?.as_int()?)?;
    Ok(engine.take_snapshots())
}

fn spectral<'r, 'a>(region: &'r mut Region<'a>, p: &[ParamValue]) -> BatchResult<SpectralFilterEngine<'r, 'a>> {
    Ok(SpectralFilterEngine::new(
        region,
        arg(p, 0)?.as_text()?,
        arg(p, 1)?.as_index()?,
    )?)
}

fn low_pass_filter(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = spectral(region, p)?;
    engine.low_pass(arg(p, 2)?.as_float()?)?;
    Ok(engine.take_snapshots())
}

fn high_pass_filter(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = spectral(region, p)?;
    engine.high_pass(arg(p, 2)?.as_float()?)?;
    Ok(engine.take_snapshots())
}

fn band_stop_filter(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = spectral(region, p)?;
    engine.band_stop(arg(p, 2)?.as_float()?, arg(p, 3)?.as_float()?)?;
    Ok(engine.take_snapshots())
}

fn sharpen_edge(region: &mut Region<'_>, p: &[ParamValue]) -> BatchResult<Vec<Snapshot>> {
    let mut engine = spectral(region, p)?;
    engine.sharpen_edges(arg(p, 2)?.as_float()?, arg(p, 3)?.as_float()?)?;
    Ok(engine.take_snapshots())
}
