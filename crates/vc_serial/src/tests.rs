//! Protocol tests across codecs and hand-written backends.

use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::desc::{ClassDesc, StructDesc};
use crate::serializer::{Loader, Saver};
use crate::value::Record;
use crate::{ElementRead, Input, Output, Serializable, SerialError, Value, ValueInput, ValueOutput};

// -----------------------------------------------------------------------------
// Fixtures

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct BoxValue as "Box" {
        value1: String,
        value2: i32,
    }
}

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Container {
        content: BoxValue,
    }
}

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Primitives {
        flag: bool,
        byte: i8,
        short: i16,
        int: i32,
        long: i64,
        float: f32,
        double: f64,
        letter: char,
        text: String,
    }
}

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Document {
        title: Option<String>,
        pages: Option<i32>,
        cover: Option<BoxValue>,
        sections: Vec<Option<Container>>,
    }
}

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Shelf {
        cover: Option<BoxValue>,
    }
}

crate::serializable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        label: String,
        children: Vec<Node> = Vec::new(),
    }
}

fn sample_box() -> BoxValue {
    BoxValue {
        value1: String::from("s1"),
        value2: 42,
    }
}

fn primitives() -> Primitives {
    Primitives {
        flag: true,
        byte: i8::MIN,
        short: -300,
        int: 42,
        long: i64::MAX,
        float: 2.5,
        double: -1e-3,
        letter: 'λ',
        text: String::from("text"),
    }
}

fn documents() -> [Document; 2] {
    let empty = Document {
        title: None,
        pages: None,
        cover: None,
        sections: Vec::new(),
    };
    let full = Document {
        title: Some(String::from("manual")),
        pages: Some(12),
        cover: Some(sample_box()),
        sections: vec![
            Some(Container {
                content: sample_box(),
            }),
            None,
        ],
    };
    [empty, full]
}

fn tree() -> Node {
    let leaf = |label: &str| Node {
        label: label.to_string(),
        children: Vec::new(),
    };
    Node {
        label: String::from("root"),
        children: vec![
            leaf("a"),
            Node {
                label: String::from("b"),
                children: vec![leaf("b1"), leaf("b2")],
            },
        ],
    }
}

// -----------------------------------------------------------------------------
// Recording output

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Begin(&'static str),
    End(&'static str),
    Str(&'static str, usize, String),
    Int(&'static str, usize, i32),
    Nested(&'static str, usize),
}

fn static_name(desc: &'static dyn ClassDesc) -> &'static str {
    desc.name()
}

/// Records the calls a codec makes; everything else stays at the defaults.
#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Output for Recorder {
    fn write_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.calls.push(Call::Begin(static_name(desc)));
        Ok(())
    }

    fn write_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.calls.push(Call::End(static_name(desc)));
        Ok(())
    }

    fn write_string_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: &str,
    ) -> Result<(), SerialError> {
        self.calls
            .push(Call::Str(static_name(desc), index, value.to_string()));
        Ok(())
    }

    fn write_int_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        value: i32,
    ) -> Result<(), SerialError> {
        self.calls.push(Call::Int(static_name(desc), index, value));
        Ok(())
    }

    fn write_serializable_element_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        self.calls.push(Call::Nested(static_name(desc), index));
        saver.save(self, value)
    }
}

// -----------------------------------------------------------------------------
// Scripted input

#[derive(Debug)]
enum Step {
    Begin(&'static str),
    /// `read_begin` answering `false`.
    NullBegin(&'static str),
    Element(&'static str, ElementRead),
    Str(&'static str, usize, &'static str),
    Int(&'static str, usize, i32),
    Nested(&'static str, usize),
    NullableNested(&'static str, usize),
    End(&'static str),
}

/// Replays a fixed script and fails on the first call that deviates from it.
struct Script {
    steps: VecDeque<Step>,
}

impl Script {
    fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    fn next(&mut self, call: impl fmt::Display) -> Result<Step, SerialError> {
        self.steps
            .pop_front()
            .ok_or_else(|| SerialError::custom(format_args!("unscripted {call}")))
    }

    fn done(&self) -> bool {
        self.steps.is_empty()
    }
}

fn deviation(call: impl fmt::Display, step: Step) -> SerialError {
    SerialError::custom(format_args!("{call} does not match {step:?}"))
}

impl Input for Script {
    fn read_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<bool, SerialError> {
        let call = format!("read_begin({desc:?})");
        match self.next(&call)? {
            Step::Begin(name) if name == desc.name() => Ok(true),
            Step::NullBegin(name) if name == desc.name() => Ok(false),
            step => Err(deviation(call, step)),
        }
    }

    fn read_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        let call = format!("read_end({desc:?})");
        match self.next(&call)? {
            Step::End(name) if name == desc.name() => Ok(()),
            step => Err(deviation(call, step)),
        }
    }

    fn read_element(&mut self, desc: &'static dyn ClassDesc) -> Result<ElementRead, SerialError> {
        let call = format!("read_element({desc:?})");
        match self.next(&call)? {
            Step::Element(name, reply) if name == desc.name() => Ok(reply),
            step => Err(deviation(call, step)),
        }
    }

    fn read_string_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<String, SerialError> {
        let call = format!("read_string_element_value({desc:?}, {index})");
        match self.next(&call)? {
            Step::Str(name, i, reply) if name == desc.name() && i == index => Ok(reply.to_string()),
            step => Err(deviation(call, step)),
        }
    }

    fn read_int_element_value(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
    ) -> Result<i32, SerialError> {
        let call = format!("read_int_element_value({desc:?}, {index})");
        match self.next(&call)? {
            Step::Int(name, i, reply) if name == desc.name() && i == index => Ok(reply),
            step => Err(deviation(call, step)),
        }
    }

    fn read_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<T, SerialError> {
        let call = format!("read_serializable_element_value({desc:?}, {index})");
        match self.next(&call)? {
            Step::Nested(name, i) if name == desc.name() && i == index => loader.load(self),
            step => Err(deviation(call, step)),
        }
    }

    fn read_nullable_serializable_element_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        desc: &'static dyn ClassDesc,
        index: usize,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        let call = format!("read_nullable_serializable_element_value({desc:?}, {index})");
        match self.next(&call)? {
            Step::NullableNested(name, i) if name == desc.name() && i == index => {
                loader.load_nullable(self)
            }
            step => Err(deviation(call, step)),
        }
    }
}

// -----------------------------------------------------------------------------
// Counting output

/// Accepts everything and checks that delimiters nest.
#[derive(Default)]
struct BracketCounter {
    depth: usize,
    max_depth: usize,
    begins: usize,
    ends: usize,
    values: usize,
}

impl Output for BracketCounter {
    fn write_begin(&mut self, _desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.begins += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        Ok(())
    }

    fn write_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.ends += 1;
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            SerialError::custom(format_args!("end of {desc:?} without a begin"))
        })?;
        Ok(())
    }

    fn write_null_value(&mut self) -> Result<(), SerialError> {
        self.values += 1;
        Ok(())
    }

    fn write_value(&mut self, _value: Value) -> Result<(), SerialError> {
        self.values += 1;
        Ok(())
    }

    fn write_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        saver.save(self, value)
    }
}

// -----------------------------------------------------------------------------
// Sequential backend

#[derive(Debug, Clone, PartialEq)]
enum Token {
    NotNull,
    Null,
    Size(usize),
    Value(Value),
}

/// A positional stream: no element addressing, explicit null marks.
#[derive(Default)]
struct SequentialOutput {
    tokens: Vec<Token>,
}

impl Output for SequentialOutput {
    fn write_size(&mut self, _desc: &'static dyn ClassDesc, size: usize) -> Result<(), SerialError> {
        self.tokens.push(Token::Size(size));
        Ok(())
    }

    fn write_not_null_mark(&mut self) -> Result<(), SerialError> {
        self.tokens.push(Token::NotNull);
        Ok(())
    }

    fn write_null_value(&mut self) -> Result<(), SerialError> {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn write_value(&mut self, value: Value) -> Result<(), SerialError> {
        self.tokens.push(Token::Value(value));
        Ok(())
    }

    fn write_serializable_value<T: ?Sized, S: Saver<T> + ?Sized>(
        &mut self,
        saver: &S,
        value: &T,
    ) -> Result<(), SerialError> {
        saver.save(self, value)
    }
}

/// Reads a [`SequentialOutput`] stream, answering `All` to every element query.
struct SequentialInput {
    tokens: VecDeque<Token>,
}

impl SequentialInput {
    fn pop(&mut self) -> Result<Token, SerialError> {
        self.tokens
            .pop_front()
            .ok_or_else(|| SerialError::custom("stream exhausted"))
    }
}

impl Input for SequentialInput {
    fn read_size(&mut self, _desc: &'static dyn ClassDesc) -> Result<Option<usize>, SerialError> {
        match self.pop()? {
            Token::Size(size) => Ok(Some(size)),
            token => Err(SerialError::custom(format_args!("expected size, got {token:?}"))),
        }
    }

    fn read_not_null_mark(&mut self) -> Result<bool, SerialError> {
        match self.tokens.front() {
            Some(Token::Null) => Ok(false),
            Some(Token::NotNull) => {
                self.tokens.pop_front();
                Ok(true)
            }
            token => Err(SerialError::custom(format_args!("expected null mark, got {token:?}"))),
        }
    }

    fn read_null_value(&mut self) -> Result<(), SerialError> {
        match self.pop()? {
            Token::Null => Ok(()),
            token => Err(SerialError::custom(format_args!("expected null, got {token:?}"))),
        }
    }

    fn read_value(&mut self) -> Result<Value, SerialError> {
        match self.pop()? {
            Token::Value(value) => Ok(value),
            token => Err(SerialError::custom(format_args!("expected value, got {token:?}"))),
        }
    }

    fn read_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<T, SerialError> {
        loader.load(self)
    }
}

/// Forwards to an inner input and checks that `read_begin`/`read_end` nest.
struct BracketTracker<I> {
    inner: I,
    depth: usize,
    max_depth: usize,
}

impl<I> BracketTracker<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            depth: 0,
            max_depth: 0,
        }
    }
}

impl<I: Input> Input for BracketTracker<I> {
    fn read_begin(&mut self, desc: &'static dyn ClassDesc) -> Result<bool, SerialError> {
        let open = self.inner.read_begin(desc)?;
        if open {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }
        Ok(open)
    }

    fn read_end(&mut self, desc: &'static dyn ClassDesc) -> Result<(), SerialError> {
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            SerialError::custom(format_args!("end of {desc:?} without a begin"))
        })?;
        self.inner.read_end(desc)
    }

    fn read_element(&mut self, desc: &'static dyn ClassDesc) -> Result<ElementRead, SerialError> {
        self.inner.read_element(desc)
    }

    fn read_size(&mut self, desc: &'static dyn ClassDesc) -> Result<Option<usize>, SerialError> {
        self.inner.read_size(desc)
    }

    fn read_not_null_mark(&mut self) -> Result<bool, SerialError> {
        self.inner.read_not_null_mark()
    }

    fn read_null_value(&mut self) -> Result<(), SerialError> {
        self.inner.read_null_value()
    }

    fn read_value(&mut self) -> Result<Value, SerialError> {
        self.inner.read_value()
    }

    fn read_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<T, SerialError> {
        loader.load(self)
    }

    fn read_nullable_serializable_value<T, L: Loader<T> + ?Sized>(
        &mut self,
        loader: &L,
    ) -> Result<Option<T>, SerialError> {
        loader.load_nullable(self)
    }
}

fn sequential_round_trip<T: Serializable>(value: &T) -> T {
    let mut output = SequentialOutput::default();
    output.write(&T::serializer(), value).unwrap();

    let mut input = SequentialInput {
        tokens: output.tokens.into(),
    };
    let back = input.read(&T::serializer()).unwrap();
    assert!(input.tokens.is_empty());
    back
}

fn tree_round_trip<T: Serializable>(value: &T) -> T {
    let boxed = ValueOutput::encode(&T::serializer(), value).unwrap();
    ValueInput::decode(boxed, &T::serializer()).unwrap()
}

/// Reverses the element order of every record in the tree.
fn reversed(value: Value) -> Value {
    match value {
        Value::Record(record) => {
            let mut out = Record::new(record.class());
            for (name, value) in record.into_elements().into_iter().rev() {
                out.push(name, reversed(value));
            }
            Value::Record(out)
        }
        other => other,
    }
}

fn reversed_round_trip<T: Serializable>(value: &T) -> T {
    let boxed = ValueOutput::encode(&T::serializer(), value).unwrap();
    ValueInput::decode(reversed(boxed), &T::serializer()).unwrap()
}

// -----------------------------------------------------------------------------
// Call sequences

#[test]
fn box_save_sequence() {
    let mut output = Recorder::default();
    output.write(&BoxValue::serializer(), &sample_box()).unwrap();
    assert_eq!(
        output.calls,
        [
            Call::Begin("Box"),
            Call::Str("Box", 0, String::from("s1")),
            Call::Int("Box", 1, 42),
            Call::End("Box"),
        ]
    );
}

#[test]
fn box_load_sequence() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(0)),
        Step::Str("Box", 0, "s1"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 42),
        Step::Element("Box", ElementRead::Done),
        Step::End("Box"),
    ]);
    assert_eq!(input.read(&BoxValue::serializer()), Ok(sample_box()));
    assert!(input.done());
}

#[test]
fn nested_save_sequence() {
    let container = Container {
        content: sample_box(),
    };
    let mut output = Recorder::default();
    output.write(&Container::serializer(), &container).unwrap();
    assert_eq!(
        output.calls,
        [
            Call::Begin("Container"),
            Call::Nested("Container", 0),
            Call::Begin("Box"),
            Call::Str("Box", 0, String::from("s1")),
            Call::Int("Box", 1, 42),
            Call::End("Box"),
            Call::End("Container"),
        ]
    );
}

#[test]
fn nested_load_sequence() {
    let mut input = Script::new([
        Step::Begin("Container"),
        Step::Element("Container", ElementRead::Index(0)),
        Step::Nested("Container", 0),
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(0)),
        Step::Str("Box", 0, "s1"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 42),
        Step::Element("Box", ElementRead::Done),
        Step::End("Box"),
        Step::Element("Container", ElementRead::Done),
        Step::End("Container"),
    ]);
    let container = input.read(&Container::serializer()).unwrap();
    assert_eq!(container.content, sample_box());
    assert!(input.done());
}

#[test]
fn script_rejects_deviation() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Str("Box", 1, "wrong kind"),
    ]);
    assert!(matches!(
        input.read(&BoxValue::serializer()),
        Err(SerialError::Custom(_))
    ));
}

#[test]
fn reverse_order_reads() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 42),
        Step::Element("Box", ElementRead::Index(0)),
        Step::Str("Box", 0, "s1"),
        Step::Element("Box", ElementRead::Done),
        Step::End("Box"),
    ]);
    assert_eq!(input.read(&BoxValue::serializer()), Ok(sample_box()));
    assert!(input.done());
}

#[test]
fn read_all_reads() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::All),
        Step::Str("Box", 0, "s1"),
        Step::Int("Box", 1, 42),
        Step::End("Box"),
    ]);
    assert_eq!(input.read(&BoxValue::serializer()), Ok(sample_box()));
    assert!(input.done());
}

// -----------------------------------------------------------------------------
// Hand-written codec

static BOX_DESC: StructDesc = StructDesc::new("Box", &["value1", "value2"]);

/// A custom serializer driving the protocol strictly in order.
struct StrictBoxSerializer;

impl Saver<BoxValue> for StrictBoxSerializer {
    fn save<O: Output + ?Sized>(&self, output: &mut O, value: &BoxValue) -> Result<(), SerialError> {
        output.write_begin(&BOX_DESC)?;
        output.write_string_element_value(&BOX_DESC, 0, &value.value1)?;
        output.write_int_element_value(&BOX_DESC, 1, value.value2)?;
        output.write_end(&BOX_DESC)
    }
}

impl Loader<BoxValue> for StrictBoxSerializer {
    fn load<I: Input + ?Sized>(&self, input: &mut I) -> Result<BoxValue, SerialError> {
        let order = |read: ElementRead, expected: ElementRead| {
            if read == expected {
                Ok(())
            } else {
                Err(SerialError::custom(format_args!("expected {expected:?}, got {read:?}")))
            }
        };
        input.read_begin(&BOX_DESC)?;
        order(input.read_element(&BOX_DESC)?, ElementRead::Index(0))?;
        let value1 = input.read_string_element_value(&BOX_DESC, 0)?;
        order(input.read_element(&BOX_DESC)?, ElementRead::Index(1))?;
        let value2 = input.read_int_element_value(&BOX_DESC, 1)?;
        order(input.read_element(&BOX_DESC)?, ElementRead::Done)?;
        input.read_end(&BOX_DESC)?;
        Ok(BoxValue { value1, value2 })
    }
}

#[test]
fn custom_serializer() {
    let mut output = Recorder::default();
    output.write(&StrictBoxSerializer, &sample_box()).unwrap();
    let mut generated = Recorder::default();
    generated.write(&BoxValue::serializer(), &sample_box()).unwrap();
    assert_eq!(output.calls, generated.calls);

    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(0)),
        Step::Str("Box", 0, "s1"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 42),
        Step::Element("Box", ElementRead::Done),
        Step::End("Box"),
    ]);
    assert_eq!(input.read(&StrictBoxSerializer), Ok(sample_box()));
    assert!(input.done());

    // Custom and generated codecs agree on the shape, so trees interoperate.
    let boxed = ValueOutput::encode(&StrictBoxSerializer, &sample_box()).unwrap();
    assert_eq!(
        ValueInput::decode(boxed, &BoxValue::serializer()),
        Ok(sample_box())
    );
}

// -----------------------------------------------------------------------------
// Round trips

#[test]
fn brackets_balance() {
    let mut counter = BracketCounter::default();
    counter.write(&Node::serializer(), &tree()).unwrap();
    for document in documents() {
        counter.write(&Document::serializer(), &document).unwrap();
    }
    counter.write(&Primitives::serializer(), &primitives()).unwrap();

    assert_eq!(counter.depth, 0);
    assert_eq!(counter.begins, counter.ends);
    // Root, its children, node b, its children, leaf b1, its empty children.
    assert_eq!(counter.max_depth, 6);
    assert!(counter.values > 0);
}

#[test]
fn load_brackets_balance() {
    fn max_depth<T: Serializable + PartialEq + fmt::Debug>(value: &T) -> usize {
        let mut output = SequentialOutput::default();
        output.write(&T::serializer(), value).unwrap();

        let mut input = BracketTracker::new(SequentialInput {
            tokens: output.tokens.into(),
        });
        assert_eq!(&input.read(&T::serializer()).unwrap(), value);
        assert_eq!(input.depth, 0);
        assert!(input.inner.tokens.is_empty());
        input.max_depth
    }

    assert_eq!(max_depth(&tree()), 6);
    let [empty, full] = documents();
    // Document, sections.
    assert_eq!(max_depth(&empty), 2);
    // Document, sections, container, box.
    assert_eq!(max_depth(&full), 4);
}

#[test]
fn round_trips_on_every_backend() {
    let prims = primitives();
    assert_eq!(tree_round_trip(&prims), prims);
    assert_eq!(reversed_round_trip(&prims), prims);
    assert_eq!(sequential_round_trip(&prims), prims);

    let node = tree();
    assert_eq!(tree_round_trip(&node), node);
    assert_eq!(reversed_round_trip(&node), node);
    assert_eq!(sequential_round_trip(&node), node);

    for document in documents() {
        assert_eq!(tree_round_trip(&document), document);
        assert_eq!(reversed_round_trip(&document), document);
        assert_eq!(sequential_round_trip(&document), document);
    }
}

#[test]
fn nullable_values() {
    let some = Some(sample_box());
    let boxed = ValueOutput::encode(&<Option<BoxValue>>::serializer(), &some).unwrap();
    assert_eq!(boxed.as_record().map(Record::class), Some("Box"));
    assert_eq!(ValueInput::decode(boxed, &<Option<BoxValue>>::serializer()), Ok(some));

    let none: Option<BoxValue> = None;
    let boxed = ValueOutput::encode(&<Option<BoxValue>>::serializer(), &none).unwrap();
    assert_eq!(boxed, Value::Null);
    assert_eq!(ValueInput::decode(boxed, &<Option<BoxValue>>::serializer()), Ok(none));

    let [empty, _] = documents();
    assert_eq!(sequential_round_trip(&empty).title, None);
}

#[test]
fn tree_serializes_to_json() {
    let boxed = ValueOutput::encode(&Document::serializer(), &documents()[1]).unwrap();
    let json = serde_json::to_value(&boxed).unwrap();
    assert_eq!(json["title"], "manual");
    assert_eq!(json["cover"]["value2"], 42);
    assert_eq!(json["sections"]["0"]["content"]["value1"], "s1");
    assert!(json["sections"]["1"].is_null());
}

#[test]
fn inline_null_records() {
    /// Signals null records only through `read_begin`.
    struct InlineNull;

    impl Input for InlineNull {
        fn read_begin(&mut self, _desc: &'static dyn ClassDesc) -> Result<bool, SerialError> {
            Ok(false)
        }
    }

    assert_eq!(InlineNull.read(&<Option<BoxValue>>::serializer()), Ok(None));
    assert_eq!(
        InlineNull.read(&BoxValue::serializer()),
        Err(SerialError::UnexpectedNull {
            expected: String::from("Box"),
        })
    );

    let mut input = Script::new([
        Step::Begin("Shelf"),
        Step::Element("Shelf", ElementRead::Index(0)),
        Step::NullableNested("Shelf", 0),
        Step::NullBegin("Box"),
        Step::Element("Shelf", ElementRead::Done),
        Step::End("Shelf"),
    ]);
    assert_eq!(input.read(&Shelf::serializer()), Ok(Shelf { cover: None }));
    assert!(input.done());

    let mut input = Script::new([
        Step::Begin("Shelf"),
        Step::Element("Shelf", ElementRead::Index(0)),
        Step::NullableNested("Shelf", 0),
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::All),
        Step::Str("Box", 0, "s1"),
        Step::Int("Box", 1, 42),
        Step::End("Box"),
        Step::Element("Shelf", ElementRead::Done),
        Step::End("Shelf"),
    ]);
    assert_eq!(
        input.read(&Shelf::serializer()),
        Ok(Shelf {
            cover: Some(sample_box()),
        })
    );
    assert!(input.done());
}

// -----------------------------------------------------------------------------
// Defaults and failures

/// Overrides nothing.
struct Bare;

impl Output for Bare {}

impl Input for Bare {}

#[test]
fn unsupported_defaults() {
    assert_eq!(
        Bare.write(&BoxValue::serializer(), &sample_box()),
        Err(SerialError::Unsupported {
            operation: "write_value"
        })
    );
    assert_eq!(
        Bare.write(&<Option<i32>>::serializer(), &None),
        Err(SerialError::Unsupported {
            operation: "write_null_value"
        })
    );
    assert_eq!(
        Bare.read(&BoxValue::serializer()),
        Err(SerialError::Unsupported {
            operation: "read_value"
        })
    );
}

#[test]
fn out_of_range_index_fails_fast() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(2)),
    ]);
    assert_eq!(
        input.read(&BoxValue::serializer()),
        Err(SerialError::Protocol(crate::ProtocolViolation::IndexOutOfRange {
            class: String::from("Box"),
            index: 2,
            count: 2,
        }))
    );
    assert!(input.done());
}

#[test]
fn duplicate_index_fails_fast() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 1),
        Step::Element("Box", ElementRead::Index(1)),
    ]);
    assert_eq!(
        input.read(&BoxValue::serializer()),
        Err(SerialError::Protocol(crate::ProtocolViolation::DuplicateElement {
            class: String::from("Box"),
            index: 1,
        }))
    );
    assert!(input.done());
}

#[test]
fn missing_and_defaulted_elements() {
    let mut input = Script::new([
        Step::Begin("Box"),
        Step::Element("Box", ElementRead::Index(1)),
        Step::Int("Box", 1, 7),
        Step::Element("Box", ElementRead::Done),
    ]);
    assert_eq!(
        input.read(&BoxValue::serializer()),
        Err(SerialError::MissingElement {
            class: String::from("Box"),
            element: String::from("value1"),
        })
    );

    let leaf = Value::Record(Record::new("Node").with("label", "leaf"));
    let node = ValueInput::decode(leaf, &Node::serializer()).unwrap();
    assert!(node.children.is_empty());
}
