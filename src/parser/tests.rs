//! Tests for the parser module.

use super::*;

fn parse_one(code: &str) -> Command {
    parse_command(code).expect("Line parses")
}

#[test]
fn memory_commands_parse() {
    assert!(matches!(parse_one("push constant 17"), Command::Push { segment: Segment::Constant, index: 17 }));
    assert!(matches!(parse_one("push local 0"), Command::Push { segment: Segment::Local, index: 0 }));
    assert!(matches!(parse_one("pop argument 2"), Command::Pop { segment: Segment::Argument, index: 2 }));
    assert!(matches!(parse_one("pop temp 7"), Command::Pop { segment: Segment::Temp, index: 7 }));
    assert!(matches!(parse_one("push pointer 1"), Command::Push { segment: Segment::Pointer, index: 1 }));
    assert!(matches!(parse_one("pop static 3"), Command::Pop { segment: Segment::Static, index: 3 }));
}

#[test]
fn operator_commands_parse() {
    assert!(matches!(parse_one("add"), Command::Binary(BinaryOp::Add)));
    assert!(matches!(parse_one("sub"), Command::Binary(BinaryOp::Sub)));
    assert!(matches!(parse_one("and"), Command::Binary(BinaryOp::And)));
    assert!(matches!(parse_one("or"), Command::Binary(BinaryOp::Or)));
    assert!(matches!(parse_one("eq"), Command::Comparison(ComparisonOp::Eq)));
    assert!(matches!(parse_one("gt"), Command::Comparison(ComparisonOp::Gt)));
    assert!(matches!(parse_one("lt"), Command::Comparison(ComparisonOp::Lt)));
    assert!(matches!(parse_one("neg"), Command::Unary(UnaryOp::Neg)));
    assert!(matches!(parse_one("not"), Command::Unary(UnaryOp::Not)));
}

#[test]
fn flow_commands_parse() {
    match parse_one("label LOOP_TOP") {
        Command::Label(name) => assert_eq!(name, "LOOP_TOP"),
        other => panic!("Expected a label, got {other:?}"),
    }

    assert!(matches!(parse_one("goto END_IF"), Command::Goto(_)));
    assert!(matches!(parse_one("if-goto LOOP_TOP"), Command::IfGoto(_)));

    match parse_one("function Main.fib 2") {
        Command::Function { name, locals } => {
            assert_eq!(name, "Main.fib");
            assert_eq!(locals, 2);
        }
        other => panic!("Expected a function, got {other:?}"),
    }

    match parse_one("call Main.fib 1") {
        Command::Call { name, args } => {
            assert_eq!(name, "Main.fib");
            assert_eq!(args, 1);
        }
        other => panic!("Expected a call, got {other:?}"),
    }

    assert!(matches!(parse_one("return"), Command::Return));
}

#[test]
fn comments_and_blank_lines_disappear() {
    let source = "\n// a full line comment\n   \npush constant 1 // trailing\n\nadd\n";
    let commands = parse_source(source).expect("Source parses");

    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].source.as_deref(), Some("push constant 1"));
    assert_eq!(commands[1].source.as_deref(), Some("add"));
}

#[test]
fn bad_lines_report_their_line_number() {
    let source = "push constant 1\nfrobnicate\n";

    match parse_source(source) {
        Err(ParseError::ProblemAtLine(msg, line)) => {
            assert_eq!(line, 2);
            assert!(msg.contains("frobnicate"));
        }
        other => panic!("Expected a located error, got {other:?}"),
    }
}

#[test]
fn malformed_operands_are_rejected() {
    assert!(parse_command("push constant").is_err());
    assert!(parse_command("push nowhere 3").is_err());
    assert!(parse_command("push constant -1").is_err());
    assert!(parse_command("push constant twelve").is_err());
    assert!(parse_command("label 9lives").is_err());
    assert!(parse_command("goto bad name").is_err());
    assert!(parse_command("add 2").is_err());
    assert!(parse_command("return 0").is_err());
}
