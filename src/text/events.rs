//! Pull parser over libyaml events.
//!
//! `serde_yaml::Value` resolves and drops core-schema tags, so `!!binary`
//! scalars would arrive as plain strings. Events keep every tag fully
//! resolved (`!!binary` becomes `tag:yaml.org,2002:binary`).

use std::ffi::{c_char, CStr};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::slice;

use unsafe_libyaml as sys;

/// Anchor and tag of a node event.
#[derive(Debug, Default)]
pub(crate) struct Props {
    pub anchor: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Scalar {
    pub props: Props,
    pub value: String,
    /// Plain (unquoted, non-block) style
    pub plain: bool,
}

#[derive(Debug)]
pub(crate) enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    Alias(String),
    Scalar(Scalar),
    SequenceStart(Props),
    SequenceEnd,
    MappingStart(Props),
    MappingEnd,
}

pub(crate) struct EventReader<'a> {
    // libyaml stores a pointer to the parser inside the parser, keep it boxed
    parser: Box<MaybeUninit<sys::yaml_parser_t>>,
    initialized: bool,
    failed: bool,
    _input: PhantomData<&'a str>,
}

impl<'a> EventReader<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut parser = Box::new(MaybeUninit::<sys::yaml_parser_t>::uninit());
        let initialized = unsafe {
            let ptr = parser.as_mut_ptr();
            let ok = sys::yaml_parser_initialize(ptr).ok;
            if ok {
                sys::yaml_parser_set_input_string(ptr, input.as_ptr(), input.len() as u64);
            }
            ok
        };
        Self {
            parser,
            initialized,
            failed: !initialized,
            _input: PhantomData,
        }
    }

    /// True once libyaml rejected the input.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Next event, `None` after a syntax error.
    pub fn next_event(&mut self) -> Option<Event> {
        if self.failed {
            return None;
        }
        let mut event = MaybeUninit::<sys::yaml_event_t>::uninit();
        unsafe {
            let event = event.as_mut_ptr();
            if !sys::yaml_parser_parse(self.parser.as_mut_ptr(), event).ok {
                self.failed = true;
                return None;
            }
            let converted = convert(&*event);
            sys::yaml_event_delete(event);
            if converted.is_none() {
                self.failed = true;
            }
            converted
        }
    }
}

impl Drop for EventReader<'_> {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { sys::yaml_parser_delete(self.parser.as_mut_ptr()) }
        }
    }
}

unsafe fn convert(event: &sys::yaml_event_t) -> Option<Event> {
    let converted = match event.type_ {
        sys::YAML_STREAM_START_EVENT => Event::StreamStart,
        sys::YAML_STREAM_END_EVENT => Event::StreamEnd,
        sys::YAML_DOCUMENT_START_EVENT => Event::DocumentStart,
        sys::YAML_DOCUMENT_END_EVENT => Event::DocumentEnd,
        sys::YAML_ALIAS_EVENT => Event::Alias(c_string(event.data.alias.anchor)?),
        sys::YAML_SCALAR_EVENT => {
            let data = event.data.scalar;
            let value = if data.value.is_null() || data.length == 0 {
                String::new()
            } else {
                let bytes = slice::from_raw_parts(data.value, data.length as usize);
                String::from_utf8_lossy(bytes).into_owned()
            };
            Event::Scalar(Scalar {
                props: Props {
                    anchor: c_string(data.anchor),
                    tag: c_string(data.tag),
                },
                value,
                plain: matches!(data.style, sys::YAML_PLAIN_SCALAR_STYLE),
            })
        }
        sys::YAML_SEQUENCE_START_EVENT => {
            let data = event.data.sequence_start;
            Event::SequenceStart(Props {
                anchor: c_string(data.anchor),
                tag: c_string(data.tag),
            })
        }
        sys::YAML_SEQUENCE_END_EVENT => Event::SequenceEnd,
        sys::YAML_MAPPING_START_EVENT => {
            let data = event.data.mapping_start;
            Event::MappingStart(Props {
                anchor: c_string(data.anchor),
                tag: c_string(data.tag),
            })
        }
        sys::YAML_MAPPING_END_EVENT => Event::MappingEnd,
        _ => return None,
    };
    Some(converted)
}

unsafe fn c_string(ptr: *const u8) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr.cast::<c_char>()).to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(text: &str) -> Vec<Event> {
        let mut reader = EventReader::new(text);
        let mut out = Vec::new();
        while let Some(event) = reader.next_event() {
            let end = matches!(event, Event::StreamEnd);
            out.push(event);
            if end {
                break;
            }
        }
        assert!(!reader.failed(), "unexpected syntax error in {:?}", text);
        out
    }

    #[test]
    fn test_core_tag_is_resolved() {
        let evs = events("a: !!binary aGVsbG8=\n");
        let tags: Vec<&str> = evs
            .iter()
            .filter_map(|e| match e {
                Event::Scalar(s) => s.props.tag.as_deref(),
                _ => None,
            })
            .collect();
        assert_eq!(tags, vec!["tag:yaml.org,2002:binary"]);
    }

    #[test]
    fn test_local_tag_and_style() {
        let evs = events("- !binary |\n  AQID\n- plain\n- 'quoted'\n");
        let scalars: Vec<&Scalar> = evs
            .iter()
            .filter_map(|e| match e {
                Event::Scalar(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(scalars.len(), 3);
        assert_eq!(scalars[0].props.tag.as_deref(), Some("!binary"));
        assert!(!scalars[0].plain);
        assert!(scalars[1].plain);
        assert_eq!(scalars[2].value, "quoted");
        assert!(!scalars[2].plain);
    }

    #[test]
    fn test_anchor_and_alias() {
        let evs = events("a: &x 1\nb: *x\n");
        assert!(evs.iter().any(|e| matches!(e, Event::Alias(name) if name == "x")));
    }

    #[test]
    fn test_syntax_error() {
        let mut reader = EventReader::new("a: [1, 2\n");
        while reader.next_event().is_some() {}
        assert!(reader.failed());
        assert!(reader.next_event().is_none());
    }
}
