use serpent_interpreter::{BufferOutput, Interpreter, Outcome};
use std::time::Instant;

static INPUT: &str = "
def fibonacci(x):
    if x == 0:
        return 0
    elif x == 1:
        return 1
    else:
        return fibonacci(x - 1) + fibonacci(x - 2)

print(fibonacci(25))
";

fn main() {
    let output = BufferOutput::new();
    let mut interpreter = Interpreter::default().with_output(output.clone());

    let start = Instant::now();
    let outcome = interpreter.run(INPUT);
    let duration = start.elapsed();

    match outcome {
        Ok(Outcome::Completed) => println!(
            "engine=tree-walker, result={}, duration={}",
            output.lines().join(" "),
            duration.as_secs_f64(),
        ),
        Ok(failed) => eprintln!("{}", failed.diagnostic().unwrap_or_default()),
        Err(err) => eprintln!("SyntaxError: {}", err),
    }
}
