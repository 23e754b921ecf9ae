mod error;

use std::io::BufRead;

use ippcode23::{Instruction, Opcode, Operand, OperandKind, Status};
use quick_xml::events::Event;
use quick_xml::Reader;

pub use error::LoaderError;

/// A decoded `instruction` element before its opcode and operand-kind
/// tokens are checked against the closed IPPcode23 vocabulary.
#[derive(Clone, Debug, Default)]
pub struct RawInstruction {
    pub order: Option<i64>,
    pub opcode: String,
    pub args: Vec<RawOperand>,
}

#[derive(Clone, Debug, Default)]
pub struct RawOperand {
    pub kind: String,
    pub text: String,
}

/// Parses an XML program document into raw instruction records, in document
/// order (not sorted by `order` — out-of-order appearance is legal and
/// the core's label indexer/executor index by `order` themselves).
pub fn parse<R: BufRead>(source: R) -> Result<Vec<RawInstruction>, LoaderError> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut instructions = Vec::new();
    let mut seen_root = false;
    let mut current: Option<RawInstruction> = None;
    let mut current_arg: Option<RawOperand> = None;
    let mut expected_arg = 1u8;

    loop {
        let event = reader.read_event(&mut buf)?;
        match &event {
            Event::Start(e) => {
                open_element(e, &reader, &mut seen_root, &mut current, &mut current_arg, &mut expected_arg)?;
            }
            Event::Empty(e) => {
                open_element(e, &reader, &mut seen_root, &mut current, &mut current_arg, &mut expected_arg)?;
                close_element(e.name(), &mut instructions, &mut current, &mut current_arg, &mut expected_arg)?;
            }
            Event::Text(e) => {
                if let Some(arg) = current_arg.as_mut() {
                    arg.text.push_str(&e.unescape_and_decode(&reader)?);
                }
            }
            Event::End(e) => {
                close_element(e.name(), &mut instructions, &mut current, &mut current_arg, &mut expected_arg)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        return Err(LoaderError::Schema("<instruction> never closed".into()));
    }
    if !seen_root {
        return Err(LoaderError::Schema("missing <program> root element".into()));
    }

    Ok(instructions)
}

fn open_element(
    e: &quick_xml::events::BytesStart,
    reader: &Reader<impl BufRead>,
    seen_root: &mut bool,
    current: &mut Option<RawInstruction>,
    current_arg: &mut Option<RawOperand>,
    expected_arg: &mut u8,
) -> Result<(), LoaderError> {
    let name = String::from_utf8_lossy(e.name()).into_owned();
    match name.as_str() {
        "program" => {
            if *seen_root || current.is_some() {
                return Err(LoaderError::Schema("nested <program>".into()));
            }
            *seen_root = true;
        }
        "instruction" => {
            if current.is_some() {
                return Err(LoaderError::Schema("nested <instruction>".into()));
            }
            let mut order = None;
            let mut opcode = String::new();
            for attr in e.attributes().flatten() {
                let value = attr.unescape_and_decode_value(reader).unwrap_or_default();
                match attr.key {
                    b"order" => order = value.trim().parse::<i64>().ok(),
                    b"opcode" => opcode = value,
                    _ => {}
                }
            }
            *current = Some(RawInstruction { order, opcode, args: Vec::new() });
            *expected_arg = 1;
        }
        "arg1" | "arg2" | "arg3" => {
            if current.is_none() {
                return Err(LoaderError::Schema(format!("<{}> outside <instruction>", name)));
            }
            let want = format!("arg{}", expected_arg);
            if name != want {
                return Err(LoaderError::Schema(format!("expected <{}>, found <{}>", want, name)));
            }
            let mut kind = String::new();
            for attr in e.attributes().flatten() {
                if attr.key == b"type" {
                    kind = attr.unescape_and_decode_value(reader).unwrap_or_default();
                }
            }
            *current_arg = Some(RawOperand { kind, text: String::new() });
        }
        other => return Err(LoaderError::Schema(format!("unexpected element <{}>", other))),
    }
    Ok(())
}

fn close_element(
    name: &[u8],
    instructions: &mut Vec<RawInstruction>,
    current: &mut Option<RawInstruction>,
    current_arg: &mut Option<RawOperand>,
    expected_arg: &mut u8,
) -> Result<(), LoaderError> {
    let name = String::from_utf8_lossy(name).into_owned();
    match name.as_str() {
        "program" => {}
        "instruction" => {
            let instruction = current.take().ok_or_else(|| LoaderError::Schema("unmatched </instruction>".into()))?;
            instructions.push(instruction);
        }
        "arg1" | "arg2" | "arg3" => {
            let arg = current_arg
                .take()
                .ok_or_else(|| LoaderError::Schema(format!("unmatched </{}>", name)))?;
            let instr = current
                .as_mut()
                .ok_or_else(|| LoaderError::Schema(format!("</{}> outside <instruction>", name)))?;
            if instr.args.len() >= 3 {
                return Err(LoaderError::Schema("more than 3 arguments".into()));
            }
            instr.args.push(arg);
            *expected_arg += 1;
        }
        _ => {}
    }
    Ok(())
}

/// Turns raw, stringly-typed records into validated `Instruction`s: resolves
/// opcode/operand-kind tokens against the closed vocabulary and checks the
/// `order` attribute (present, non-negative, unique). This is purely a
/// decode step — per-opcode argument shape is the core `validator`'s job.
pub fn decode(raw: Vec<RawInstruction>) -> Result<Vec<Instruction>, Status> {
    let mut seen_orders = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for record in raw {
        let order = record
            .order
            .filter(|&o| o >= 0)
            .map(|o| o as u64)
            .ok_or(Status::InvalidXml)?;
        if !seen_orders.insert(order) {
            return Err(Status::InvalidXml);
        }
        let opcode = Opcode::parse(&record.opcode)?;
        let args = record
            .args
            .into_iter()
            .map(|arg| {
                let kind = OperandKind::parse(&arg.kind)?;
                Ok(Operand { kind, text: arg.text })
            })
            .collect::<Result<Vec<_>, Status>>()?;
        out.push(Instruction { order, opcode, args });
    }
    Ok(out)
}

/// Parses and decodes a complete XML program document in one step.
pub fn load<R: BufRead>(source: R) -> Result<Vec<Instruction>, Status> {
    let raw = parse(source).map_err(|err| err.status())?;
    decode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(body: &str) -> &'static [u8] {
        Box::leak(format!("<program>{}</program>", body).into_bytes().into_boxed_slice())
    }

    #[test]
    fn parses_a_single_instruction() {
        let xml = program(
            r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>"#,
        );
        let raw = parse(xml).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].order, Some(1));
        assert_eq!(raw[0].opcode, "DEFVAR");
        assert_eq!(raw[0].args[0].kind, "var");
        assert_eq!(raw[0].args[0].text, "GF@x");
    }

    #[test]
    fn self_closed_arg_yields_empty_text() {
        let xml = program(r#"<instruction order="1" opcode="CREATEFRAME"/>"#);
        let raw = parse(xml).unwrap();
        assert_eq!(raw[0].args.len(), 0);
    }

    #[test]
    fn out_of_sequence_arg_tags_are_schema_errors() {
        let xml = program(
            r#"<instruction order="1" opcode="MOVE"><arg2 type="int">1</arg2></instruction>"#,
        );
        assert!(matches!(parse(xml), Err(LoaderError::Schema(_))));
    }

    #[test]
    fn missing_order_is_invalid_xml_after_decode() {
        let xml = program(r#"<instruction opcode="CREATEFRAME"/>"#);
        let raw = parse(xml).unwrap();
        assert_eq!(decode(raw), Err(Status::InvalidXml));
    }

    #[test]
    fn duplicate_order_is_invalid_xml() {
        let xml = program(
            r#"<instruction order="1" opcode="CREATEFRAME"/><instruction order="1" opcode="BREAK"/>"#,
        );
        let raw = parse(xml).unwrap();
        assert_eq!(decode(raw), Err(Status::InvalidXml));
    }

    #[test]
    fn unknown_opcode_is_invalid_xml() {
        let xml = program(r#"<instruction order="1" opcode="FROBNICATE"/>"#);
        let raw = parse(xml).unwrap();
        assert_eq!(decode(raw), Err(Status::InvalidXml));
    }

    #[test]
    fn load_runs_parse_then_decode() {
        let xml = program(
            r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>"#,
        );
        let instructions = load(xml).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].opcode, Opcode::DEFVAR);
    }
}
