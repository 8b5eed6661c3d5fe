use eimu_transport::available_ports;

use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let ports = available_ports().map_err(|err| transport_error("port scan failed", err))?;

    match format {
        OutputFormat::Json => print_json(&ports),
        OutputFormat::Table => {
            let rows = ports
                .iter()
                .map(|port| {
                    vec![
                        port.name.clone(),
                        port.kind.to_string(),
                        port.product.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(vec!["PORT", "KIND", "PRODUCT"], rows);
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for port in &ports {
                match &port.product {
                    Some(product) => println!("{} ({}, {product})", port.name, port.kind),
                    None => println!("{} ({})", port.name, port.kind),
                }
            }
        }
    }

    Ok(SUCCESS)
}
