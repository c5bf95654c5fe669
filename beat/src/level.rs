//! Level description: named layers of rectangles with properties.
//!
//! Layers named `bricks` and `deadZone` carry gameplay objects. Every layer
//! is also a drawable map layer; names starting with `front_` are drawn in
//! front of the entities, the rest behind them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::components::Gate;
use crate::error::LevelError;
use crate::math::Rect;

pub const BRICKS_LAYER: &str = "bricks";
pub const DEAD_ZONE_LAYER: &str = "deadZone";
const FOREGROUND_PREFIX: &str = "front_";

/// Hit count marking a brick as a gate.
pub const GATE_HIT: i32 = -2;

/// A rectangle placed in the level editor. `x`/`y` is the bottom-left corner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl MapObject {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

/// Anything that can describe a level as named object layers.
pub trait TileMapSource {
    /// Layer names, in drawing order.
    fn layer_names(&self) -> Vec<String>;

    /// Objects of the layer called `name`; empty when there is no such layer.
    fn objects(&self, name: &str) -> &[MapObject];
}

/// Level stored as JSON: `{ "layers": [ { "name": ..., "objects": [...] } ] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonTileMap {
    pub layers: Vec<ObjectLayer>,
}

impl JsonTileMap {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TileMapSource for JsonTileMap {
    fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    fn objects(&self, name: &str) -> &[MapObject] {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.objects.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrickSpec {
    /// Resting place of the brick.
    pub bounds: Rect,
    pub hit: i32,
    /// Timing of a gate brick; `None` for every other brick.
    pub gate: Option<Gate>,
}

impl BrickSpec {
    pub fn is_breakable(&self) -> bool {
        self.hit > 0
    }
}

/// Gameplay content extracted from a map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    pub bricks: Vec<BrickSpec>,
    pub dead_zones: Vec<Rect>,
    pub background: Vec<usize>,
    pub foreground: Vec<usize>,
}

impl Level {
    pub fn from_map(map: &dyn TileMapSource) -> Result<Self, LevelError> {
        let bricks = map
            .objects(BRICKS_LAYER)
            .iter()
            .enumerate()
            .map(|(index, object)| brick(object, index))
            .collect::<Result<Vec<_>, _>>()?;

        let dead_zones = map
            .objects(DEAD_ZONE_LAYER)
            .iter()
            .map(MapObject::bounds)
            .collect();

        let names = map.layer_names();
        let (foreground, background): (Vec<usize>, Vec<usize>) = (0..names.len())
            .partition(|&i| names[i].starts_with(FOREGROUND_PREFIX));

        Ok(Self {
            bricks,
            dead_zones,
            background,
            foreground,
        })
    }
}

fn brick(object: &MapObject, index: usize) -> Result<BrickSpec, LevelError> {
    let hit = match object.properties.get("hit") {
        None => {
            return Err(LevelError::MissingProperty {
                layer: BRICKS_LAYER.into(),
                index,
                property: "hit".into(),
            })
        }
        Some(value) => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| invalid(index, "hit", "an integer"))?,
    };

    let gate = if hit == GATE_HIT {
        let defaults = Gate::default();
        Some(Gate {
            open: bool_property(object, index, "open", defaults.open)?,
            open_time: float_property(object, index, "openTime", defaults.open_time)?,
            close_time: float_property(object, index, "closeTime", defaults.close_time)?,
        })
    } else {
        None
    };

    Ok(BrickSpec {
        bounds: object.bounds(),
        hit,
        gate,
    })
}

fn bool_property(
    object: &MapObject,
    index: usize,
    name: &str,
    default: bool,
) -> Result<bool, LevelError> {
    match object.properties.get(name) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(index, name, "a boolean")),
    }
}

fn float_property(
    object: &MapObject,
    index: usize,
    name: &str,
    default: f32,
) -> Result<f32, LevelError> {
    match object.properties.get(name) {
        None => Ok(default),
        Some(value) => value
            .as_f64()
            .filter(|v| *v >= 0.0)
            .map(|v| v as f32)
            .ok_or_else(|| invalid(index, name, "a non-negative number")),
    }
}

fn invalid(index: usize, property: &str, expected: &'static str) -> LevelError {
    LevelError::InvalidProperty {
        layer: BRICKS_LAYER.into(),
        index,
        property: property.into(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "layers": [
            { "name": "background" },
            { "name": "bricks", "objects": [
                { "x": 8, "y": 150, "width": 16, "height": 8, "properties": { "hit": 2 } },
                { "x": 0, "y": 100, "width": 16, "height": 8, "properties": { "hit": 0 } },
                { "x": 56, "y": 120, "width": 16, "height": 16,
                  "properties": { "hit": -2, "open": false, "openTime": 2.5 } }
            ] },
            { "name": "deadZone", "objects": [
                { "x": 0, "y": -10, "width": 128, "height": 10 }
            ] },
            { "name": "front_leaves" }
        ]
    }"#;

    #[test]
    fn test_parse_level() {
        let map = JsonTileMap::from_json(LEVEL).unwrap();
        let level = Level::from_map(&map).unwrap();

        assert_eq!(level.bricks.len(), 3);
        assert_eq!(level.bricks[0].bounds, Rect::new(8.0, 150.0, 16.0, 8.0));
        assert!(level.bricks[0].is_breakable());
        assert!(!level.bricks[1].is_breakable());
        assert_eq!(level.bricks[1].gate, None);

        let gate = level.bricks[2].gate.unwrap();
        assert!(!gate.open);
        assert_eq!(gate.open_time, 2.5);
        assert_eq!(gate.close_time, 1.0);

        assert_eq!(level.dead_zones, vec![Rect::new(0.0, -10.0, 128.0, 10.0)]);
        assert_eq!(level.background, vec![0, 1, 2]);
        assert_eq!(level.foreground, vec![3]);
    }

    #[test]
    fn test_missing_layers_are_empty() {
        let map = JsonTileMap::from_json(r#"{ "layers": [] }"#).unwrap();
        let level = Level::from_map(&map).unwrap();
        assert!(level.bricks.is_empty() && level.dead_zones.is_empty());
    }

    #[test]
    fn test_missing_hit_is_an_error() {
        let map = JsonTileMap::from_json(
            r#"{ "layers": [ { "name": "bricks", "objects": [
                { "x": 0, "y": 0, "width": 8, "height": 8 } ] } ] }"#,
        )
        .unwrap();
        let err = Level::from_map(&map).unwrap_err();
        assert!(matches!(err, LevelError::MissingProperty { index: 0, .. }));
    }

    #[test]
    fn test_non_integer_hit_is_an_error() {
        let map = JsonTileMap::from_json(
            r#"{ "layers": [ { "name": "bricks", "objects": [
                { "x": 0, "y": 0, "width": 8, "height": 8, "properties": { "hit": "lots" } } ] } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            Level::from_map(&map),
            Err(LevelError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            JsonTileMap::from_json("{ nope"),
            Err(LevelError::Parse(_))
        ));
    }
}
