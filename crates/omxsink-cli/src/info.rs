// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::session::{self, DisplayTask};
use crate::utils;
use clap::Args as ClapArgs;
use omxsink::{
    component::{Platform, PortDefinition},
    display::{Display, VIDEO_RENDER_COMPONENT},
};
use serde::Serialize;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Configure the port for this resolution (WxH) before reading it back
    #[arg(short, long)]
    resolution: Option<String>,
}

/// Video render port as reported by the hardware
#[derive(Debug, Serialize)]
pub struct PortInfo {
    component: &'static str,
    port: u32,
    state: String,
    width: u32,
    height: u32,
    stride: i32,
    slice_height: u32,
    buffer_count: u32,
    buffer_count_min: u32,
    buffer_size: u32,
    enabled: bool,
    populated: bool,
}

impl PortInfo {
    fn new(definition: &PortDefinition, state: String) -> Self {
        PortInfo {
            component: VIDEO_RENDER_COMPONENT,
            port: definition.port,
            state,
            width: definition.width,
            height: definition.height,
            stride: definition.stride,
            slice_height: definition.slice_height,
            buffer_count: definition.buffer_count,
            buffer_count_min: definition.buffer_count_min,
            buffer_size: definition.buffer_size,
            enabled: definition.enabled,
            populated: definition.populated,
        }
    }

    fn print_text(&self) {
        println!("=== {} ===", self.component);
        println!("Port:              {}", self.port);
        println!("State:             {}", self.state);
        println!(
            "Geometry:          {}x{} (stride {}, slice height {})",
            self.width, self.height, self.stride, self.slice_height
        );
        println!(
            "Buffers:           {} x {} bytes (min {})",
            self.buffer_count, self.buffer_size, self.buffer_count_min
        );
        println!("Enabled:           {}", self.enabled);
        println!("Populated:         {}", self.populated);
    }
}

pub fn execute(args: Args, json: bool, mock: bool) -> Result<(), CliError> {
    let resolution = args
        .resolution
        .as_deref()
        .map(utils::parse_resolution)
        .transpose()?;

    let info = session::dispatch(InfoTask { resolution }, mock)?;

    if json {
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", json);
    } else {
        info.print_text();
    }
    Ok(())
}

struct InfoTask {
    resolution: Option<(u32, u32)>,
}

impl DisplayTask for InfoTask {
    type Output = PortInfo;

    fn run<P: Platform>(self, display: &mut Display<P>) -> Result<PortInfo, CliError> {
        display.init()?;

        let result = match self.resolution {
            Some((width, height)) => display
                .enable(width, height, width as i32)
                .and_then(|()| display.port_definition()),
            None => display.port_definition(),
        };
        let state = display.state().to_string();

        if self.resolution.is_some() {
            display.disable()?;
        }
        display.deinit()?;

        Ok(PortInfo::new(&result?, state))
    }
}
