
use vmtranslator::command::{BinaryOp, Command, ComparisonOp, Segment, SourcedCommand, UnaryOp};
use vmtranslator::machine::Machine;
use vmtranslator::{translate_string, BootstrapSettings, Settings, Translator};

/// Translates hand built commands under a bootstrap that initializes the
/// registers but calls nothing, then executes the output. Control falls off
/// the last command into the halt loop the finalization appends.
fn run_commands(commands: Vec<Command>) -> Machine {
    let settings =
        Settings { bootstrap: Some(BootstrapSettings { call_entry: false, stack_base: 256 }) };

    let mut translator = Translator::new(&settings);
    let commands: Vec<SourcedCommand> = commands.into_iter().map(SourcedCommand::bare).collect();
    translator.add_commands(&commands);

    let lines = translator.finish();
    println!("{}", lines.join("\n"));

    let mut machine = Machine::new(&lines).expect("Output assembles");
    machine.run(1_000_000).expect("Program halts");

    machine
}

fn push_constant(value: u16) -> Command {
    Command::Push { segment: Segment::Constant, index: value }
}

#[test]
fn binary_operations_consume_two_and_produce_one() {
    // The repeated add exercises the jump into the already emitted body.
    let machine = run_commands(vec![
        push_constant(1),
        push_constant(2),
        Command::Binary(BinaryOp::Add),
        push_constant(30),
        push_constant(12),
        Command::Binary(BinaryOp::Sub),
        push_constant(12),
        push_constant(10),
        Command::Binary(BinaryOp::And),
        push_constant(12),
        push_constant(10),
        Command::Binary(BinaryOp::Or),
        push_constant(3),
        push_constant(4),
        Command::Binary(BinaryOp::Add),
    ]);

    assert_eq!(machine.ram(256), 3);
    assert_eq!(machine.ram(257), 18);
    assert_eq!(machine.ram(258), 8);
    assert_eq!(machine.ram(259), 14);
    assert_eq!(machine.ram(260), 7);
    assert_eq!(machine.stack_pointer(), 261);
}

#[test]
fn unary_operations_work_in_place() {
    let machine = run_commands(vec![
        push_constant(5),
        Command::Unary(UnaryOp::Neg),
        push_constant(0),
        Command::Unary(UnaryOp::Not),
    ]);

    assert_eq!(machine.ram(256), -5);
    assert_eq!(machine.ram(257), -1);
    assert_eq!(machine.stack_pointer(), 258);
}

#[test]
fn comparisons_push_all_ones_or_zero() {
    let machine = run_commands(vec![
        push_constant(3),
        push_constant(3),
        Command::Comparison(ComparisonOp::Eq),
        push_constant(2),
        push_constant(5),
        Command::Comparison(ComparisonOp::Gt),
        push_constant(2),
        push_constant(5),
        Command::Comparison(ComparisonOp::Lt),
    ]);

    assert_eq!(machine.ram(256), -1);
    assert_eq!(machine.ram(257), 0);
    assert_eq!(machine.ram(258), -1);
    assert_eq!(machine.stack_pointer(), 259);
}

#[test]
fn call_and_return_replace_arguments_with_the_return_value() {
    let machine = run_commands(vec![
        push_constant(21),
        Command::Call { name: "Main.double".to_string(), args: 1 },
        Command::Goto("FINISH".to_string()),
        Command::Function { name: "Main.double".to_string(), locals: 0 },
        Command::Push { segment: Segment::Argument, index: 0 },
        Command::Push { segment: Segment::Argument, index: 0 },
        Command::Binary(BinaryOp::Add),
        Command::Return,
        Command::Label("FINISH".to_string()),
    ]);

    assert_eq!(machine.ram(256), 42);
    assert_eq!(machine.stack_pointer(), 257);
}

#[test]
fn locals_are_zeroed_and_the_frame_is_restored() {
    let machine = run_commands(vec![
        push_constant(1),
        push_constant(2),
        Command::Call { name: "Main.f".to_string(), args: 0 },
        Command::Goto("FINISH".to_string()),
        Command::Function { name: "Main.f".to_string(), locals: 2 },
        Command::Push { segment: Segment::Local, index: 0 },
        Command::Push { segment: Segment::Local, index: 1 },
        Command::Binary(BinaryOp::Add),
        push_constant(5),
        Command::Binary(BinaryOp::Add),
        Command::Return,
        Command::Label("FINISH".to_string()),
    ]);

    // Both locals were zero, so the function returns 0 + 0 + 5.
    assert_eq!(machine.ram(256), 1);
    assert_eq!(machine.ram(257), 2);
    assert_eq!(machine.ram(258), 5);
    assert_eq!(machine.stack_pointer(), 259);

    // The caller's linkage registers came back out of the saved frame.
    assert_eq!(machine.ram(1), 256);
    assert_eq!(machine.ram(2), 256);
    assert_eq!(machine.ram(3), 3000);
    assert_eq!(machine.ram(4), 4000);
}

#[test]
fn loops_terminate_through_if_goto() {
    // Sums 1..=5 into temp 1 with a countdown in temp 0.
    let machine = run_commands(vec![
        push_constant(5),
        Command::Pop { segment: Segment::Temp, index: 0 },
        Command::Label("LOOP".to_string()),
        Command::Push { segment: Segment::Temp, index: 0 },
        Command::IfGoto("BODY".to_string()),
        Command::Goto("DONE".to_string()),
        Command::Label("BODY".to_string()),
        Command::Push { segment: Segment::Temp, index: 1 },
        Command::Push { segment: Segment::Temp, index: 0 },
        Command::Binary(BinaryOp::Add),
        Command::Pop { segment: Segment::Temp, index: 1 },
        Command::Push { segment: Segment::Temp, index: 0 },
        push_constant(1),
        Command::Binary(BinaryOp::Sub),
        Command::Pop { segment: Segment::Temp, index: 0 },
        Command::Goto("LOOP".to_string()),
        Command::Label("DONE".to_string()),
    ]);

    assert_eq!(machine.ram(5), 0);
    assert_eq!(machine.ram(6), 15);
    assert_eq!(machine.stack_pointer(), 256);
}

#[test]
fn popping_to_constant_stores_through_the_immediate() {
    let machine = run_commands(vec![push_constant(9), Command::Pop { segment: Segment::Constant, index: 30 }]);

    assert_eq!(machine.ram(30), 9);
    assert_eq!(machine.stack_pointer(), 256);
}

#[test]
fn pointer_writes_select_the_base_registers() {
    let machine = run_commands(vec![
        push_constant(1234),
        Command::Pop { segment: Segment::Pointer, index: 1 },
        push_constant(7),
        Command::Pop { segment: Segment::Pointer, index: 3 },
    ]);

    // Index 1 writes the THAT base; any other index, the THIS base.
    assert_eq!(machine.ram(4), 1234);
    assert_eq!(machine.ram(3), 7);
}

#[test]
fn statics_are_namespaced_per_module() {
    let settings =
        Settings { bootstrap: Some(BootstrapSettings { call_entry: false, stack_base: 256 }) };

    let mut translator = Translator::new(&settings);
    translator.add_module("Alpha", "push constant 11\npop static 0\n").expect("Module parses");
    translator
        .add_module("Beta", "push constant 22\npop static 0\npush static 0\n")
        .expect("Module parses");

    let lines = translator.finish();
    assert!(lines.iter().any(|line| line.starts_with("@Alpha.0")));
    assert!(lines.iter().any(|line| line.starts_with("@Beta.0")));

    let mut machine = Machine::new(&lines).expect("Output assembles");
    machine.run(1_000_000).expect("Program halts");

    // Two distinct cells, allocated in order of first appearance, and the
    // read in Beta sees Beta's value.
    assert_eq!(machine.ram(16), 11);
    assert_eq!(machine.ram(17), 22);
    assert_eq!(machine.ram(256), 22);
}

#[test]
fn whole_program_bootstrap_calls_the_entry_function() {
    let source = "function Sys.init 0\n\
                  push constant 7\n\
                  push constant 35\n\
                  add\n\
                  label HALT\n\
                  goto HALT\n";

    let lines = translate_string("Sys", source, &Settings::whole_program()).expect("Translates");

    let mut machine = Machine::new(&lines).expect("Output assembles");
    machine.run(1_000_000).expect("Program halts");

    // The entry call leaves a five cell frame above the stack base: the
    // return address at 256, then the caller's LCL, ARG, THIS, THAT.
    assert_eq!(machine.ram(257), 256);
    assert_eq!(machine.ram(258), 256);
    assert_eq!(machine.ram(259), 3000);
    assert_eq!(machine.ram(260), 4000);

    // The entry function's own stack starts right above the frame.
    assert_eq!(machine.ram(261), 42);
    assert_eq!(machine.stack_pointer(), 262);
}
