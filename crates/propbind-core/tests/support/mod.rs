//! Schemas shared by the binding tests.

#![allow(dead_code)]

use propbind_core::{config_enum, config_schema, config_type};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEnum {
    None,
    A,
    B,
}

config_enum!(TestEnum { None => "NONE", A => "A", B => "B" });

/// Value type built from `part1:part2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubConfigFromString {
    part1: String,
    part2: String,
}

impl SubConfigFromString {
    pub fn part1(&self) -> &str {
        &self.part1
    }

    pub fn part2(&self) -> &str {
        &self.part2
    }
}

impl FromStr for SubConfigFromString {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(':');
        let (Some(part1), Some(part2)) = (parts.next(), parts.next()) else {
            return Err(format!("expected part1:part2, got {raw}"));
        };
        Ok(Self {
            part1: part1.to_string(),
            part2: part2.to_string(),
        })
    }
}

impl fmt::Display for SubConfigFromString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.part1, self.part2)
    }
}

config_type!(SubConfigFromString, from_str);

config_schema! {
    pub struct SubConfig {
        value str: String = "default";
    }
}

config_schema! {
    pub struct BaseConfig {
        value get_str: String = "basedefault";
        value get_base_boolean: Option<bool>;
    }
}

config_schema! {
    /// Root of the nested scenario.
    pub struct RootConfig: BaseConfig {
        value get_str: String = "default";
        value get_integer: i32 = "0";
        value get_enum: TestEnum = "NONE";
        nested get_sub_config: SubConfig;
        value get_sub_config_from_string: SubConfigFromString = "default1:default2";
    }
}
