use anyhow::Result;
use tracing_subscriber::EnvFilter;

use focuslens::{
    Axis, CategoryFilter, CategoryId, CoordinationBus, Frame, LinkedView, Record, ScreenPoint,
    VariableFilter, ViewConfig,
};

fn sample_records() -> Vec<Record> {
    let categories = ["smoking", "diet", "physical_activity", "sleep"];
    (0..40)
        .map(|i| {
            let x = (i as f64 * 0.37).sin().abs() * 9.0 + 0.5;
            let y = (i as f64 * 0.21).cos().abs() * 6.0 + 1.0;
            Record::new(x, y, categories[i % categories.len()])
        })
        .collect()
}

fn print_frame(frame: &Frame) -> Result<()> {
    let emphasized = frame.emphasized().count();
    println!(
        "{:>8} #{:<3} marks {:>2} emphasized {:>2} lens {}",
        frame.view.as_str(),
        frame.generation,
        frame.marks.len(),
        emphasized,
        if frame.lens_active { "on" } else { "off" },
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bus = CoordinationBus::new();
    let records = sample_records();

    let mut scatter = LinkedView::builder("scatter")
        .records(records.clone())
        .renderer(print_frame)
        .build(&bus)?;
    let mut strip = LinkedView::builder("strip")
        .records(records)
        .config(ViewConfig::default().with_size(960.0, 260.0))
        .renderer(print_frame)
        .build(&bus)?;
    strip.mirror_pointer("scatter", Axis::X)?;

    let mut legend = CategoryFilter::new(
        "legend",
        ["smoking", "diet", "physical_activity", "sleep"],
        &bus,
    );
    let variables = VariableFilter::new(
        "variables",
        [
            ("pack_years", "smoking"),
            ("fruit_intake", "diet"),
            ("daily_steps", "physical_activity"),
            ("sleep_hours", "sleep"),
        ],
        &bus,
    )?;

    legend.enter(&CategoryId::new("diet"));
    println!("visible variables: {:?}", variables.visible_rows());
    legend.click(&CategoryId::new("sleep"));
    legend.leave();

    scatter.pointer_move(ScreenPoint::new(300.0, 200.0))?;
    let lens = strip.x_scale();
    println!("strip lens focus: {:?}", lens.focus());
    scatter.pointer_leave()?;

    strip.resize(1200.0, 300.0)?;
    println!("strip redraws: {}", strip.redraws());
    Ok(())
}
