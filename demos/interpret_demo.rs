use sinumerik_toolpath::parser::parse_line;
use sinumerik_toolpath::{interpret, ProgramCatalog};

fn main() {
    println!("=== Line Parser ===");

    let test_lines = [
        "N10 G0 X0 Z0 ; rapid to origin",
        "R1=180 R2=R1/2",
        "N05 M4 S=R1*2",
        "MSG(\"1.OP ROUGHING\")",
        "; comment only",
        "",
    ];

    for line in test_lines {
        println!("\nInput: '{}'", line);
        println!("Parsed: {:?}", parse_line(line));
    }

    println!("\n=== Interpreter ===");

    let catalog = ProgramCatalog::with_examples();
    println!("{}", catalog.summary());

    if let Some(program) = catalog.first_main() {
        let session = interpret(&program.content);
        println!("\n{} -> {} points", program.name, session.points().len());
        for point in session.points() {
            println!(
                "  line {:>3}  {:<5} X{:<8.3} Z{:<8.3} (screen y {:.3})",
                point.source_line + 1,
                point.mnemonic(),
                point.x,
                point.z,
                point.screen_y()
            );
        }
        println!("Total time: {}", session.estimate());
    }

    for program in catalog.sub_programs() {
        if let Some(label) = program.info().and_then(|info| info.label()) {
            println!("{}: {}", program.name, label);
        }
    }
}
