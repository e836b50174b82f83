use std::sync::Arc;

use meta_commons::convert::{DataType, ParameterSpec};
use meta_commons::log::MemoryLogger;
use meta_commons::{Config, JsonOptions, Schema};

fn main() -> Result<(), meta_commons::Error> {
    let mut meta = Config::builder()
        .with_json(
            r#"{
                "app": {"name": "shop", "debug": "off"},
                "orders": {
                    "o1": {"total": 12, "placed": "2024-03-01 10:00:00"},
                    "o2": {"total": "7.5", "placed": "not a date"}
                }
            }"#,
        )
        .with_env("SHOP", "__")
        .build()?;

    meta.increment("visits", 1, Some("app"))?;
    let revenue = meta.sum("orders", Some("total"), &[])?;
    println!("{} revenue: {revenue}", meta["app.name"]);

    let logger = Arc::new(MemoryLogger::new());
    let schema = Schema::builder()
        .parameter("debug", ParameterSpec::new(DataType::Boolean))
        .parameter("placed", ParameterSpec::new(DataType::DateTime))
        .logger(logger.clone())
        .build()?;

    println!("debug = {:?}", schema.to_typed("debug", &meta["app.debug"])?);
    for order in ["o1", "o2"] {
        let placed = &meta[format!("orders.{order}.placed").as_str()];
        println!("{order} placed = {:?}", schema.to_typed("placed", placed)?);
    }

    for event in logger.events() {
        print!("{event}");
    }

    println!("{}", meta.to_json_with(JsonOptions::pretty()));
    Ok(())
}
