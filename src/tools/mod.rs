mod audio_source;
mod ffmpeg_command;
mod ffprobe_info;
mod frame_sink;
mod frame_source;
mod time_cost;

pub use audio_source::AudioTrack;
pub use ffmpeg_command::{concat_videos, crop_video, mux_video_audio};
pub use ffprobe_info::{VideoMeta, get_video_meta, has_audio_stream};
pub use frame_sink::{FfmpegFrameWriter, FrameSink};
pub use frame_source::{FfmpegFrameReader, Frame, FrameSource};
pub use time_cost::TimeCost;
